use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::storage::StorageError;
use crate::orchestrator::OrchestrationError;
use crate::resumes::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Analysis(#[from] OrchestrationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Body(rejection) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                rejection.body_text(),
            ),
            AppError::Analysis(err) => analysis_parts(err),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORAGE_UNAVAILABLE",
                    "The file storage service is unavailable".to_string(),
                )
            }
        }
    }
}

fn analysis_parts(err: &OrchestrationError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        OrchestrationError::MissingInput(_) => (StatusCode::BAD_REQUEST, "MISSING_INPUT"),
        OrchestrationError::NotFoundOrDenied => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        OrchestrationError::StorageUnavailable(detail) => {
            tracing::error!("Storage error: {detail}");
            (StatusCode::BAD_GATEWAY, "STORAGE_UNAVAILABLE")
        }
        OrchestrationError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
        OrchestrationError::UnsupportedType(_) => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FILE_TYPE")
        }
        OrchestrationError::EmptyDocument => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_DOCUMENT"),
        OrchestrationError::Unknown(detail) => {
            tracing::error!("Analysis failed: {detail}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ANALYSIS_FAILED",
                "Failed to analyze resume".to_string(),
            );
        }
    };
    (status, code, err.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
