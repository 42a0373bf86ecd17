use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editor::EditorError;
use crate::export::ExportError;
use crate::generation::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Busy(String),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Busy(msg) => (StatusCode::CONFLICT, "BUSY", msg.clone()),
            AppError::Editor(e @ EditorError::IndexOutOfRange { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
            }
            AppError::Editor(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Generation(GenerationError::EmptyDescription) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                GenerationError::EmptyDescription.to_string(),
            ),
            AppError::Generation(e) => {
                tracing::warn!("Generation error: {e}");
                (StatusCode::BAD_GATEWAY, "GENERATION_ERROR", e.to_string())
            }
            AppError::Export(ExportError::Busy) => (
                StatusCode::CONFLICT,
                "BUSY",
                ExportError::Busy.to_string(),
            ),
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXPORT_ERROR",
                    "Could not export the resume. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
