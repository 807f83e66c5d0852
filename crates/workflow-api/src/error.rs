//! A single `ApiError` -> HTTP status mapping shared by every handler,
//! rather than a `.map_err(...)` closure repeated per route.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use workflow_engine::EngineError;
use workflow_scheduler::SchedulerError;
use workflow_storage::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    Conflict { entity: &'static str, key: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            ApiError::Store(_) => {
                tracing::error!(error = %self, "storage error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Engine(EngineError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Engine(_) => {
                tracing::error!(error = %self, "engine error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Scheduler(SchedulerError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Scheduler(SchedulerError::TaskUnavailable(_)) => StatusCode::BAD_REQUEST,
            ApiError::Scheduler(SchedulerError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Scheduler(SchedulerError::NotCancelled(_)) => StatusCode::CONFLICT,
            ApiError::Scheduler(SchedulerError::RedisStore(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Scheduler(SchedulerError::Store(_)) => {
                tracing::error!(error = %self, "scheduler store error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, axum::Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
