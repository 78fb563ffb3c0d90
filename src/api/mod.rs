pub mod auth;
pub mod department;
pub mod escalation;
pub mod floor;
pub mod health;
pub mod patient;
pub mod role;
pub mod staff;
pub mod ward;

use axum::{
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_me))
        // Departments
        .route(
            "/departments",
            get(department::list_departments).post(department::create_department),
        )
        .route(
            "/departments/:id",
            get(department::get_department)
                .put(department::update_department)
                .delete(department::delete_department),
        )
        // Floors
        .route("/floors", get(floor::list_floors).post(floor::create_floor))
        .route(
            "/floors/:id",
            get(floor::get_floor)
                .put(floor::update_floor)
                .delete(floor::delete_floor),
        )
        // Wards
        .route("/wards", get(ward::list_wards).post(ward::create_ward))
        .route(
            "/wards/:id",
            get(ward::get_ward)
                .put(ward::update_ward)
                .delete(ward::delete_ward),
        )
        // Roles & escalation ladders
        .route("/roles", get(role::list_roles).post(role::create_role))
        .route(
            "/roles/:id",
            get(role::get_role)
                .put(role::update_role)
                .delete(role::delete_role),
        )
        .route(
            "/roles/:id/chain",
            put(role::set_chain).delete(role::clear_chain),
        )
        .route("/escalation/chains", get(escalation::list_chain_groups))
        // Staff directory
        .route("/staff", get(staff::list_staff).post(staff::create_staff))
        .route(
            "/staff/:id",
            get(staff::get_staff)
                .put(staff::update_staff)
                .delete(staff::delete_staff),
        )
        // Patients
        .route(
            "/patients",
            get(patient::list_patients).post(patient::create_patient),
        )
        .route(
            "/patients/:id",
            get(patient::get_patient)
                .put(patient::update_patient)
                .delete(patient::delete_patient),
        )
        .with_state(db)
}
