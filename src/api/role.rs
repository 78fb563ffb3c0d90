use crate::auth::Claims;
use crate::models::role::{self, Entity as Role};
use crate::services::escalation::{self, ChainStep};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::*;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;

#[derive(Deserialize)]
pub struct CreateRoleRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    name: Option<String>,
}

#[derive(Deserialize)]
pub struct SetChainRequest {
    steps: Vec<ChainStep>,
}

pub async fn list_roles(claims: Claims, State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match Role::find()
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .all(&db)
        .await
    {
        Ok(roles) => Json(roles).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn create_role(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateRoleRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name is required" })),
        )
            .into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let new_role = role::ActiveModel {
        hospital_id: Set(claims.hospital_id),
        name: Set(payload.name),
        escalation_chain: Set("[]".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match new_role.insert(&db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to create role: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn get_role(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Role::find_by_id(id)
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(role)) => Json(role).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Role not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn update_role(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> impl IntoResponse {
    let role = match Role::find_by_id(id)
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(r)) => r,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Role not found" })),
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

    let mut active: role::ActiveModel = role.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to update role: {}", e) })),
        )
            .into_response(),
    }
}

/// Deleting a role also strips it out of every other role's ladder so no
/// chain is left pointing at a missing target.
pub async fn delete_role(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let role = match Role::find_by_id(id)
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(r)) => r,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Role not found" })),
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

    if let Err(e) = role.delete(&db).await {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to delete role: {}", e) })),
        )
            .into_response();
    }

    let siblings = match Role::find()
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .all(&db)
        .await
    {
        Ok(roles) => roles,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Database error: {}", e) })),
            )
                .into_response();
        }
    };

    for sibling in siblings {
        let steps = escalation::parse_chain(&sibling.escalation_chain);
        let stripped = escalation::strip_target(steps.clone(), id);
        if stripped.len() == steps.len() {
            continue;
        }

        let mut active: role::ActiveModel = sibling.into();
        active.escalation_chain = Set(escalation::serialize_chain(&stripped));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        if let Err(e) = active.update(&db).await {
            tracing::error!("Failed to strip deleted role {} from chain: {}", id, e);
        }
    }

    Json(json!({ "message": "Role deleted" })).into_response()
}

/// Replace a role's escalation ladder. The whole ladder is validated and
/// swapped in one go; an invalid submission leaves the stored chain as-is.
pub async fn set_chain(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<SetChainRequest>,
) -> impl IntoResponse {
    let role = match Role::find_by_id(id)
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(r)) => r,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Role not found" })),
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

    let known_roles: HashSet<i32> = match Role::find()
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .all(&db)
        .await
    {
        Ok(roles) => roles.into_iter().map(|r| r.id).collect(),
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Database error: {}", e) })),
            )
                .into_response();
        }
    };

    if let Err(e) = escalation::validate_chain(role.id, &payload.steps, &known_roles) {
        tracing::warn!("Rejected chain for role {}: {}", role.id, e);
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response();
    }

    let mut active: role::ActiveModel = role.into();
    active.escalation_chain = Set(escalation::serialize_chain(&payload.steps));
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to update chain: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn clear_chain(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let role = match Role::find_by_id(id)
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(r)) => r,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Role not found" })),
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

    let mut active: role::ActiveModel = role.into();
    active.escalation_chain = Set("[]".to_string());
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to clear chain: {}", e) })),
        )
            .into_response(),
    }
}
