use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::indexing::IndexError;
use crate::ranking::error::RankingError;

pub const PREDICTION_FAILED_MESSAGE: &str = "AI prediction failed.";
pub const EXTRACTION_FAILED_MESSAGE: &str = "Text extraction failed.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No applications: {0}")]
    NoApplications(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RankingError> for AppError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::JobNotFound(_) => AppError::NotFound(err.to_string()),
            RankingError::NoApplications(_) => AppError::NoApplications(err.to_string()),
            RankingError::AlreadyRanked(_) => AppError::Conflict(err.to_string()),
            RankingError::Validation(msg) => AppError::Validation(msg),
            RankingError::Prediction(e) => AppError::Prediction(e.to_string()),
            RankingError::Persist(e) => AppError::Prediction(e.to_string()),
            RankingError::Store(e) => AppError::Store(e.to_string()),
        }
    }
}

impl From<IndexError> for AppError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::ApplicationNotFound(_) => AppError::NotFound(err.to_string()),
            IndexError::Validation(msg) => AppError::Validation(msg),
            IndexError::Extraction(e) => AppError::Extraction(e.to_string()),
            IndexError::Store(e) => AppError::Store(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NoApplications(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_APPLICATIONS",
                msg.clone(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "ALREADY_RANKED", msg.clone()),
            AppError::Prediction(msg) => {
                tracing::error!("Prediction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PREDICTION_FAILED",
                    PREDICTION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Extraction(msg) => {
                tracing::error!("Extraction error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EXTRACTION_FAILED",
                    EXTRACTION_FAILED_MESSAGE.to_string(),
                )
            }
            AppError::Store(msg) => {
                tracing::error!("Store error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
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
