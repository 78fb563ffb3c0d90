use crate::auth::Claims;
use crate::models::{
    department::{self, Entity as Department},
    role::{self, Entity as Role},
    staff::{self, Entity as Staff},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct CreateStaffRequest {
    name: String,
    title: Option<String>,
    department_id: Option<i32>,
    role_id: Option<i32>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStaffRequest {
    name: Option<String>,
    title: Option<String>,
    department_id: Option<i32>,
    role_id: Option<i32>,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(Deserialize)]
pub struct StaffQuery {
    pub department_id: Option<i32>,
    pub role_id: Option<i32>,
}

async fn check_references(
    db: &DatabaseConnection,
    hospital_id: i32,
    department_id: Option<i32>,
    role_id: Option<i32>,
) -> Result<(), String> {
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
    if let Some(role_id) = role_id {
        let found = Role::find_by_id(role_id)
            .filter(role::Column::HospitalId.eq(hospital_id))
            .one(db)
            .await
            .map_err(|e| format!("Database error: {}", e))?;
        if found.is_none() {
            return Err("Unknown role".to_string());
        }
    }
    Ok(())
}

// List staff with optional department / role filters
pub async fn list_staff(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Query(params): Query<StaffQuery>,
) -> impl IntoResponse {
    let mut query = Staff::find().filter(staff::Column::HospitalId.eq(claims.hospital_id));

    if let Some(department_id) = params.department_id {
        query = query.filter(staff::Column::DepartmentId.eq(department_id));
    }
    if let Some(role_id) = params.role_id {
        query = query.filter(staff::Column::RoleId.eq(role_id));
    }

    match query.all(&db).await {
        Ok(staff) => Json(json!({ "staff": staff, "total": staff.len() })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn create_staff(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateStaffRequest>,
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
        payload.department_id,
        payload.role_id,
    )
    .await
    {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let member = staff::ActiveModel {
        hospital_id: Set(claims.hospital_id),
        name: Set(payload.name),
        title: Set(payload.title),
        department_id: Set(payload.department_id),
        role_id: Set(payload.role_id),
        email: Set(payload.email),
        phone: Set(payload.phone),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match member.insert(&db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to create staff member: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn get_staff(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Staff::find_by_id(id)
        .filter(staff::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(member)) => Json(member).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Staff member not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn update_staff(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStaffRequest>,
) -> impl IntoResponse {
    let member = match Staff::find_by_id(id)
        .filter(staff::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(m)) => m,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Staff member not found" })),
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
        payload.department_id,
        payload.role_id,
    )
    .await
    {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
    }

    let mut active: staff::ActiveModel = member.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(title) = payload.title {
        active.title = Set(Some(title));
    }
    if let Some(department_id) = payload.department_id {
        active.department_id = Set(Some(department_id));
    }
    if let Some(role_id) = payload.role_id {
        active.role_id = Set(Some(role_id));
    }
    if let Some(email) = payload.email {
        active.email = Set(Some(email));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to update staff member: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn delete_staff(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let member = match Staff::find_by_id(id)
        .filter(staff::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(m)) => m,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Staff member not found" })),
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

    match member.delete(&db).await {
        Ok(_) => Json(json!({ "message": "Staff member deleted" })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to delete staff member: {}", e) })),
        )
            .into_response(),
    }
}
