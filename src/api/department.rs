use crate::auth::Claims;
use crate::models::department::{self, Entity as Department};
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
pub struct CreateDepartmentRequest {
    name: String,
    description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDepartmentRequest {
    name: Option<String>,
    description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "Departments of the session's hospital"),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub async fn list_departments(
    claims: Claims,
    State(db): State<DatabaseConnection>,
) -> impl IntoResponse {
    match Department::find()
        .filter(department::Column::HospitalId.eq(claims.hospital_id))
        .all(&db)
        .await
    {
        Ok(departments) => Json(departments).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/departments",
    responses(
        (status = 201, description = "Department created"),
        (status = 400, description = "Missing required field")
    )
)]
pub async fn create_department(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateDepartmentRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name is required" })),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let department = department::ActiveModel {
        hospital_id: Set(claims.hospital_id),
        name: Set(payload.name),
        description: Set(payload.description),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match department.insert(&db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to create department: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn get_department(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Department::find_by_id(id)
        .filter(department::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(department)) => Json(department).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Department not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn update_department(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateDepartmentRequest>,
) -> impl IntoResponse {
    let department = match Department::find_by_id(id)
        .filter(department::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(d)) => d,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Department not found" })),
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

    let mut active: department::ActiveModel = department.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to update department: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn delete_department(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let department = match Department::find_by_id(id)
        .filter(department::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(d)) => d,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Department not found" })),
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

    match department.delete(&db).await {
        Ok(_) => Json(json!({ "message": "Department deleted" })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to delete department: {}", e) })),
        )
            .into_response(),
    }
}
