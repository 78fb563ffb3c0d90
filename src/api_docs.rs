use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::department::list_departments,
        api::department::create_department,
        // Add other endpoints here as we document them
    ),
    tags(
        (name = "wardline", description = "Hospital administration API")
    )
)]
pub struct ApiDoc;
