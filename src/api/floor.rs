use crate::auth::Claims;
use crate::models::floor::{self, Entity as Floor};
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
pub struct CreateFloorRequest {
    name: String,
    #[serde(default)]
    level: i32,
}

#[derive(Deserialize)]
pub struct UpdateFloorRequest {
    name: Option<String>,
    level: Option<i32>,
}

pub async fn list_floors(claims: Claims, State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Floor::find()
        .filter(floor::Column::HospitalId.eq(claims.hospital_id))
        .order_by_asc(floor::Column::Level)
        .all(&db)
        .await
    {
        Ok(floors) => Json(floors).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn create_floor(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateFloorRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name is required" })),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let floor = floor::ActiveModel {
        hospital_id: Set(claims.hospital_id),
        name: Set(payload.name),
        level: Set(payload.level),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match floor.insert(&db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to create floor: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn get_floor(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Floor::find_by_id(id)
        .filter(floor::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(floor)) => Json(floor).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Floor not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn update_floor(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateFloorRequest>,
) -> impl IntoResponse {
    let floor = match Floor::find_by_id(id)
        .filter(floor::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(f)) => f,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Floor not found" })),
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

    let mut active: floor::ActiveModel = floor.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(level) = payload.level {
        active.level = Set(level);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to update floor: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn delete_floor(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let floor = match Floor::find_by_id(id)
        .filter(floor::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(f)) => f,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Floor not found" })),
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

    match floor.delete(&db).await {
        Ok(_) => Json(json!({ "message": "Floor deleted" })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to delete floor: {}", e) })),
        )
            .into_response(),
    }
}
