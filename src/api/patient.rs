use crate::auth::Claims;
use crate::models::{
    patient::{self, Entity as Patient},
    ward::{self, Entity as Ward},
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
pub struct CreatePatientRequest {
    name: String,
    mrn: Option<String>,
    ward_id: Option<i32>,
    attending_staff_id: Option<i32>,
    admitted_at: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePatientRequest {
    name: Option<String>,
    mrn: Option<String>,
    ward_id: Option<i32>,
    attending_staff_id: Option<i32>,
    admitted_at: Option<String>,
}

#[derive(Deserialize)]
pub struct PatientsQuery {
    pub ward_id: Option<i32>,
}

async fn check_ward(
    db: &DatabaseConnection,
    hospital_id: i32,
    ward_id: Option<i32>,
) -> Result<(), String> {
    if let Some(ward_id) = ward_id {
        let found = Ward::find_by_id(ward_id)
            .filter(ward::Column::HospitalId.eq(hospital_id))
            .one(db)
            .await
            .map_err(|e| format!("Database error: {}", e))?;
        if found.is_none() {
            return Err("Unknown ward".to_string());
        }
    }
    Ok(())
}

pub async fn list_patients(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Query(params): Query<PatientsQuery>,
) -> impl IntoResponse {
    let mut query = Patient::find().filter(patient::Column::HospitalId.eq(claims.hospital_id));

    if let Some(ward_id) = params.ward_id {
        query = query.filter(patient::Column::WardId.eq(ward_id));
    }

    match query.all(&db).await {
        Ok(patients) => Json(json!({ "patients": patients, "total": patients.len() })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn create_patient(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreatePatientRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Name is required" })),
        )
            .into_response();
    }

    if let Err(msg) = check_ward(&db, claims.hospital_id, payload.ward_id).await {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
    }

    let now = chrono::Utc::now().to_rfc3339();
    let patient = patient::ActiveModel {
        hospital_id: Set(claims.hospital_id),
        name: Set(payload.name),
        mrn: Set(payload.mrn),
        ward_id: Set(payload.ward_id),
        attending_staff_id: Set(payload.attending_staff_id),
        admitted_at: Set(payload.admitted_at),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    match patient.insert(&db).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to create patient: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn get_patient(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match Patient::find_by_id(id)
        .filter(patient::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(patient)) => Json(patient).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Patient not found" })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Database error: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn update_patient(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePatientRequest>,
) -> impl IntoResponse {
    let patient = match Patient::find_by_id(id)
        .filter(patient::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Patient not found" })),
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

    if let Err(msg) = check_ward(&db, claims.hospital_id, payload.ward_id).await {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response();
    }

    let mut active: patient::ActiveModel = patient.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(mrn) = payload.mrn {
        active.mrn = Set(Some(mrn));
    }
    if let Some(ward_id) = payload.ward_id {
        active.ward_id = Set(Some(ward_id));
    }
    if let Some(attending_staff_id) = payload.attending_staff_id {
        active.attending_staff_id = Set(Some(attending_staff_id));
    }
    if let Some(admitted_at) = payload.admitted_at {
        active.admitted_at = Set(Some(admitted_at));
    }
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    match active.update(&db).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to update patient: {}", e) })),
        )
            .into_response(),
    }
}

pub async fn delete_patient(
    claims: Claims,
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let patient = match Patient::find_by_id(id)
        .filter(patient::Column::HospitalId.eq(claims.hospital_id))
        .one(&db)
        .await
    {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "Patient not found" })),
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

    match patient.delete(&db).await {
        Ok(_) => Json(json!({ "message": "Patient deleted" })).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to delete patient: {}", e) })),
        )
            .into_response(),
    }
}
