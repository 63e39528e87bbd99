//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for the lesson
//! catalog. It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::error;

use crate::{
    models::{ErrorResponse, LessonDetail, LessonSummary},
    state::ServiceState,
};

pub enum ApiError {
    NotFound(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                let message = "An internal server error occurred.".to_string();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

/// List all lessons in the catalog, sorted by title.
#[utoipa::path(
    get,
    path = "/lessons",
    responses(
        (status = 200, description = "List of available lessons", body = [LessonSummary]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_lessons(State(state): State<ServiceState>) -> Json<Vec<LessonSummary>> {
    let lessons = state
        .catalog
        .list()
        .into_iter()
        .map(LessonSummary::from)
        .collect();
    Json(lessons)
}

/// Get a specific lesson by its id, steps included.
#[utoipa::path(
    get,
    path = "/lessons/{id}",
    responses(
        (status = 200, description = "Lesson detail", body = LessonDetail),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("id" = String, Path, description = "Lesson id")
    )
)]
pub async fn get_lesson(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
) -> Result<Json<LessonDetail>, ApiError> {
    let lesson = state
        .catalog
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Lesson with id '{}' not found", id)))?;
    Ok(Json(LessonDetail::from(lesson)))
}
