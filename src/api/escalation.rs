use crate::auth::Claims;
use crate::models::role::{self, Entity as Role};
use crate::services::escalation::group_chains;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::*;
use serde_json::json;

/// Grouped view of the hospital's escalation ladders: roles sharing an
/// identical chain signature collapse into one display unit.
pub async fn list_chain_groups(
    claims: Claims,
    State(db): State<DatabaseConnection>,
) -> impl IntoResponse {
    let roles = match Role::find()
        .filter(role::Column::HospitalId.eq(claims.hospital_id))
        .order_by_asc(role::Column::Id)
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

    let groups = group_chains(&roles);
    Json(json!({ "groups": groups, "total": groups.len() })).into_response()
}
