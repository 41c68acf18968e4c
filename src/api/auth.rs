use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::{Value, json};

use crate::auth;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{LoginRequest, SettingsPatch};
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Password is required".to_string()))?;

    if !auth::verify_password(&state.db, &password).await? {
        return Err(AppError::Unauthorized);
    }

    let admin = repository::latest_admin(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No admin account found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "settings": {
            "hide_completed_lectures": admin.hide_completed_lectures,
        },
    })))
}

pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;

    let admin = repository::latest_admin(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No admin account found".to_string()))?;

    Ok(Json(json!({
        "hide_completed_lectures": admin.hide_completed_lectures,
    })))
}

pub async fn patch_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SettingsPatch>,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;

    let hide = body.hide_completed_lectures.ok_or_else(|| {
        AppError::BadRequest("hide_completed_lectures must be a boolean".to_string())
    })?;

    repository::update_admin_settings(&state.db, hide).await?;

    Ok(Json(json!({
        "success": true,
        "hide_completed_lectures": hide,
    })))
}
