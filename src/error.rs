use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Crawler API 연결 실패")]
    Upstream(String),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire shape for every error: `{ "error": ... }`, with raw detail attached
/// on 5xx responses for operator diagnosis.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized - Invalid or missing password".to_string(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Upstream(detail) => {
                error!("crawler upstream error: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Crawler API 연결 실패".to_string(),
                    Some(detail),
                )
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::Io(e) => {
                error!("io error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "File error".to_string(),
                    Some(e.to_string()),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            details,
        });

        (status, body).into_response()
    }
}
