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

#[tokio::test]
async fn test_department_crud_lifecycle() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    // Create
    let req = request(
        "POST",
        "/departments",
        &token,
        Some(serde_json::json!({ "name": "Cardiology", "description": "Cardiac care" })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Cardiology");
    assert_eq!(created["hospital_id"], hospital_id);

    // List
    let req = request("GET", "/departments", &token, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = json_body(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    // Update
    let req = request(
        "PUT",
        &format!("/departments/{}", id),
        &token,
        Some(serde_json::json!({ "name": "Cardiac Care" })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["name"], "Cardiac Care");
    assert_eq!(updated["description"], "Cardiac care");

    // Delete
    let req = request("DELETE", &format!("/departments/{}", id), &token, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Gone
    let req = request("GET", &format!("/departments/{}", id), &token, None);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_name() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    for uri in ["/departments", "/floors", "/wards", "/roles", "/staff", "/patients"] {
        let req = request("POST", uri, &token, Some(serde_json::json!({ "name": "  " })));
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_hospital_scoping_isolation() {
    let db = setup_test_db().await;
    let hospital_a = create_test_hospital(&db, "General").await;
    let hospital_b = create_test_hospital(&db, "Riverside").await;
    let token_a = token_for(hospital_a);
    let token_b = token_for(hospital_b);
    let app = api::api_router(db);

    // Hospital A creates a ward
    let req = request(
        "POST",
        "/wards",
        &token_a,
        Some(serde_json::json!({ "name": "Ward 2A", "bed_count": 12 })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let ward = json_body(response).await;
    let ward_id = ward["id"].as_i64().unwrap();

    // Hospital B sees an empty list
    let req = request("GET", "/wards", &token_b, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let list = json_body(response).await;
    assert!(list.as_array().unwrap().is_empty());

    // Hospital B cannot fetch, update or delete it - indistinguishable from absent
    let req = request("GET", &format!("/wards/{}", ward_id), &token_b, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = request(
        "PUT",
        &format!("/wards/{}", ward_id),
        &token_b,
        Some(serde_json::json!({ "name": "Hijacked" })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = request("DELETE", &format!("/wards/{}", ward_id), &token_b, None);
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still there for hospital A
    let req = request("GET", &format!("/wards/{}", ward_id), &token_a, None);
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ward_rejects_foreign_references() {
    let db = setup_test_db().await;
    let hospital_a = create_test_hospital(&db, "General").await;
    let hospital_b = create_test_hospital(&db, "Riverside").await;
    let token_a = token_for(hospital_a);
    let token_b = token_for(hospital_b);
    let app = api::api_router(db);

    // Floor belongs to hospital B
    let req = request(
        "POST",
        "/floors",
        &token_b,
        Some(serde_json::json!({ "name": "Second Floor", "level": 2 })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let floor = json_body(response).await;
    let floor_id = floor["id"].as_i64().unwrap();

    // Hospital A cannot hang a ward off it
    let req = request(
        "POST",
        "/wards",
        &token_a,
        Some(serde_json::json!({ "name": "Ward 2A", "floor_id": floor_id })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown floor outright
    let req = request(
        "POST",
        "/wards",
        &token_a,
        Some(serde_json::json!({ "name": "Ward 2A", "floor_id": 9999 })),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_staff_list_filters() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    let req = request(
        "POST",
        "/departments",
        &token,
        Some(serde_json::json!({ "name": "Emergency" })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let department_id = json_body(response).await["id"].as_i64().unwrap();

    for (name, dept) in [("Dr. Rao", Some(department_id)), ("Dr. Cole", None)] {
        let mut payload = serde_json::json!({ "name": name });
        if let Some(d) = dept {
            payload["department_id"] = serde_json::json!(d);
        }
        let req = request("POST", "/staff", &token, Some(payload));
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let req = request(
        "GET",
        &format!("/staff?department_id={}", department_id),
        &token,
        None,
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["staff"][0]["name"], "Dr. Rao");

    let req = request("GET", "/staff", &token, None);
    let response = app.oneshot(req).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_patient_census_by_ward() {
    let db = setup_test_db().await;
    let hospital_id = create_test_hospital(&db, "General").await;
    let token = token_for(hospital_id);
    let app = api::api_router(db);

    let req = request(
        "POST",
        "/wards",
        &token,
        Some(serde_json::json!({ "name": "Ward 2A" })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    let ward_id = json_body(response).await["id"].as_i64().unwrap();

    let req = request(
        "POST",
        "/patients",
        &token,
        Some(serde_json::json!({ "name": "Jordan Mills", "mrn": "MRN-1", "ward_id": ward_id })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = request(
        "POST",
        "/patients",
        &token,
        Some(serde_json::json!({ "name": "Sam Avery" })),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let req = request("GET", &format!("/patients?ward_id={}", ward_id), &token, None);
    let response = app.clone().oneshot(req).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["patients"][0]["name"], "Jordan Mills");

    // Patient in an unknown ward is rejected
    let req = request(
        "POST",
        "/patients",
        &token,
        Some(serde_json::json!({ "name": "Nia Wolfe", "ward_id": 4242 })),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
