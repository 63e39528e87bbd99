//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, WebSocket endpoint, and OpenAPI documentation.

use crate::{
    handlers,
    models::{ErrorResponse, LessonDetail, LessonSummary, StepDetail},
    state::ServiceState,
    ws::ws_handler,
};

use axum::{Router, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::list_lessons, handlers::get_lesson),
    components(schemas(LessonSummary, LessonDetail, StepDetail, ErrorResponse)),
    tags(
        (name = "Studychat API", description = "Lesson catalog and chat for the Studychat tutoring assistant")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(state: ServiceState) -> Router {
    // Group all routes that require ServiceState into their own router.
    let api_router = Router::new()
        .route("/lessons", get(handlers::list_lessons))
        .route("/lessons/{id}", get(handlers::get_lesson))
        .route("/ws", get(ws_handler))
        .with_state(state);

    // Merge the stateful routes with the stateless Swagger UI.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
