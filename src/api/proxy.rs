use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// Transparent JSON relay to the external crawler service. Status and body
/// pass through unchanged; only connection failures become errors (503).
pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    method: Method,
    body: Bytes,
) -> Result<Response, AppError> {
    let body: Option<Value> = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };

    let upstream = state.crawler.forward(method.as_str(), &path, body).await?;
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(upstream.body)).into_response())
}
