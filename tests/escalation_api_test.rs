use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt; // for `oneshot`

use wardline::{api, auth, db};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_hospital(db: &DatabaseConnection, name: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let hospital = wardline::models::hospital::ActiveModel {
        name: Set(name.to_string()),
        address: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    hospital
        .insert(db)
        .await
        .expect("Failed to create hospital")
        .id
}

fn token_for(hospital_id: i32) -> String {
    auth::create_jwt("admin", hospital_id, "admin").expect("Failed to create token")
}

fn request(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .uri(uri)
        .method(method)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_role(
    app: &axum::Router,
    token: &str,
    name: &str,
) -> i64 {
    let req = request("POST", "/roles", token, Some(serde_json::json!({ "name": name })));
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["id"].as_i64().unwrap()
}

fn steps(pairs: &[(i64, i64)]) -> serde_json::Value {
    serde_json::json!({
        "steps": pairs
            .iter()
            .map(|(t, d)| serde_json::json!({ "target_role_id": t, "delay_minutes": d }))
            .collect::<Vec<_>>()
    })
}

#[tokio::test]
async fn test_build_and_clear_ladder() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    let physician = create_role(&app, &token, "Physician on-call").await;
    let supervisor = create_role(&app, &token, "Supervisor").await;
    let ceo = create_role(&app, &token, "CEO").await;

    let req = request(
        "PUT",
        &format!("/roles/{}/chain", physician),
        &token,
        Some(steps(&[(supervisor, 15), (ceo, 30)])),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let saved = json_body(response).await;
    let chain: serde_json::Value =
        serde_json::from_str(saved["escalation_chain"].as_str().unwrap()).unwrap();
    assert_eq!(chain[0]["target_role_id"], supervisor);
    assert_eq!(chain[1]["delay_minutes"], 30);

    // Clearing resets to an empty ladder
    let req = request("DELETE", &format!("/roles/{}/chain", physician), &token, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = json_body(response).await;
    assert_eq!(cleared["escalation_chain"], "[]");
}

#[tokio::test]
async fn test_duplicate_target_blocks_saving() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    let physician = create_role(&app, &token, "Physician on-call").await;
    let supervisor = create_role(&app, &token, "Supervisor").await;

    // Valid single-step ladder first
    let req = request(
        "PUT",
        &format!("/roles/{}/chain", physician),
        &token,
        Some(steps(&[(supervisor, 15)])),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Duplicate target is rejected...
    let req = request(
        "PUT",
        &format!("/roles/{}/chain", physician),
        &token,
        Some(steps(&[(supervisor, 0), (supervisor, 30)])),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("more than once"));

    // ...and the stored ladder is unchanged
    let req = request("GET", &format!("/roles/{}", physician), &token, None);
    let response = app.oneshot(req).await.unwrap();
    let role = json_body(response).await;
    let chain: serde_json::Value =
        serde_json::from_str(role["escalation_chain"].as_str().unwrap()).unwrap();
    assert_eq!(chain.as_array().unwrap().len(), 1);
    assert_eq!(chain[0]["delay_minutes"], 15);
}

#[tokio::test]
async fn test_invalid_ladders_rejected() {
    let db = setup_test_db().await;
    let hospital_a = create_test_hospital(&db, "General").await;
    let hospital_b = create_test_hospital(&db, "Riverside").await;
    let token_a = token_for(hospital_a);
    let token_b = token_for(hospital_b);
    let app = api::api_router(db);

    let physician = create_role(&app, &token_a, "Physician on-call").await;
    let supervisor = create_role(&app, &token_a, "Supervisor").await;
    let foreign = create_role(&app, &token_b, "Other-hospital role").await;

    // Self-escalation
    let req = request(
        "PUT",
        &format!("/roles/{}/chain", physician),
        &token_a,
        Some(steps(&[(physician, 0)])),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Target from another hospital
    let req = request(
        "PUT",
        &format!("/roles/{}/chain", physician),
        &token_a,
        Some(steps(&[(foreign, 0)])),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Negative delay
    let req = request(
        "PUT",
        &format!("/roles/{}/chain", physician),
        &token_a,
        Some(steps(&[(supervisor, -10)])),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_grouped_chains_view() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    let physician = create_role(&app, &token, "Physician on-call").await;
    let charge_nurse = create_role(&app, &token, "Charge nurse").await;
    let supervisor = create_role(&app, &token, "Supervisor").await;
    let ceo = create_role(&app, &token, "CEO").await;

    // Physician and charge nurse share a ladder
    for role_id in [physician, charge_nurse] {
        let req = request(
            "PUT",
            &format!("/roles/{}/chain", role_id),
            &token,
            Some(steps(&[(supervisor, 15), (ceo, 30)])),
        );
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let req = request("GET", "/escalation/chains", &token, None);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    // Shared ladder + empty ladder (supervisor and CEO both have none)
    assert_eq!(body["total"], 2);
    let groups = body["groups"].as_array().unwrap();

    let shared = &groups[0];
    assert_eq!(shared["roles"].as_array().unwrap().len(), 2);
    assert_eq!(shared["steps"][0]["target_role_name"], "Supervisor");
    assert_eq!(shared["steps"][1]["delay_minutes"], 30);
    assert_eq!(shared["is_empty"], false);

    let empty = &groups[1];
    assert_eq!(empty["is_empty"], true);
    assert_eq!(empty["roles"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_deleting_role_strips_it_from_other_chains() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    let physician = create_role(&app, &token, "Physician on-call").await;
    let supervisor = create_role(&app, &token, "Supervisor").await;
    let ceo = create_role(&app, &token, "CEO").await;

    let req = request(
        "PUT",
        &format!("/roles/{}/chain", physician),
        &token,
        Some(steps(&[(supervisor, 15), (ceo, 30)])),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = request("DELETE", &format!("/roles/{}", supervisor), &token, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let req = request("GET", &format!("/roles/{}", physician), &token, None);
    let response = app.oneshot(req).await.unwrap();
    let role = json_body(response).await;
    let chain: serde_json::Value =
        serde_json::from_str(role["escalation_chain"].as_str().unwrap()).unwrap();
    let steps = chain.as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["target_role_id"], ceo);
}
