use crate::auth::Claims;
use crate::models::{
    department::{self, Entity as Department},
    floor::{self, Entity as Floor},
    ward::{self, Entity as Ward},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct CreateWardRequest {
    name: String,
    floor_id: Option<i32>,
    department_id: Option<i32>,
    bed_count: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateWardRequest {
    name: Option<String>,
    floor_id: Option<i32>,
    department_id: Option<i32>,
    bed_count: Option<i32>,
}

// A ward may only reference floors and departments of its own hospital.
async fn check_references(
    db: &DatabaseConnection,
    hospital_id: i32,
    floor_id: Option<i32>,
    department_id: Option<i32>,
) -> Result<(), String> {
    if let Some(floor_id) = floor_id {
        let found = Floor::find_by_id(floor_id)
            .filter(floor::Column::HospitalId.eq(hospital_id))
            .one(db)
            .await
            .map_err(|e| format!("Database error: {}", e))?;
        if found.is_none() {
            return Err("Unknown floor".to_string());
        }
    }
    if let Some(department_id) = department_id {
        let found = Department::find_by_id(department_id)
            .filter(department::Column::HospitalId.eq(hospital_id))
            .one(db)
            .await
            .map_err(|e| format!("Database error: {}", e))?;
        if found.is_none() {
            return Err("Unknown department".to_string());
        }
    }
    Ok(())
}

pub async fn list_wards(claims: Claims, State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Ward::find()
        .filter(ward::Column::HospitalId.eq(claims.hospital_id))
        .all(&db)
        .await
    {
        Ok(wards) => Json(wards).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn create_ward(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateWardRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name is required" })),
        )
            .into_response();
    }

    if let Err(msg) = check_references(
        &db,
        claims.hospital_id,
        payload.floor_id,
        payload.department_id,
    )
    .await
    {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let ward = ward::ActiveModel {
        hospital_id: Set(claims.hospital_id),
        name: Set(payload.name),
        floor_id: Set(payload.floor_id),
        department_id: Set(payload.department_id),
        bed_count: Set(payload.bed_count),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match ward.insert(&db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to create ward: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn get_ward(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Ward::find_by_id(id)
        .filter(ward::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(ward)) => Json(ward).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Ward not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn update_ward(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateWardRequest>,
) -> impl IntoResponse {
    let ward = match Ward::find_by_id(id)
        .filter(ward::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(w)) => w,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Ward not found" })),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Database error: {}", e) })),
            )
                .into_response();
        }
    };

    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Name is required" })),
            )
                .into_response();
        }
    }

    if let Err(msg) = check_references(
        &db,
        claims.hospital_id,
        payload.floor_id,
        payload.department_id,
    )
    .await
    {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
    }

    let mut active: ward::ActiveModel = ward.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(floor_id) = payload.floor_id {
        active.floor_id = Set(Some(floor_id));
    }
    if let Some(department_id) = payload.department_id {
        active.department_id = Set(Some(department_id));
    }
    if let Some(bed_count) = payload.bed_count {
        active.bed_count = Set(Some(bed_count));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to update ward: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn delete_ward(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let ward = match Ward::find_by_id(id)
        .filter(ward::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(w)) => w,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Ward not found" })),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Database error: {}", e) })),
            )
                .into_response();
        }
    };

    match ward.delete(&db).await {
        Ok(_) => Json(json!({ "message": "Ward deleted" })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to delete ward: {}", e) })),
        )
            .into_response(),
    }
}
