pub mod auth;
pub mod courses;
pub mod crawl;
pub mod lectures;
pub mod proxy;
pub mod resumes;
pub mod stats;

use axum::extract::DefaultBodyLimit;
use axum::routing::{any, delete, get, patch, post};
use axum::{Router, extract::State, http::StatusCode};

use crate::error::AppError;
use crate::state::AppState;

/// Resume uploads are capped at 10 MiB; leave headroom for multipart framing.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(courses::list_courses))
        .route("/courses/search", get(courses::search_courses))
        .route("/courses/target", get(courses::get_target))
        .route(
            "/courses/{id}",
            get(courses::get_course).patch(courses::patch_course),
        )
        .route("/courses/{id}/visibility", patch(courses::patch_visibility))
        .route(
            "/courses/{id}/manually-completed",
            patch(courses::patch_manually_completed),
        )
        .route("/courses/{id}/set-target", post(courses::set_target))
        .route("/courses/{id}/clear-target", delete(courses::clear_target))
        .route("/lectures/{id}", patch(lectures::patch_lecture))
        .route("/stats/summary", get(stats::summary))
        .route("/stats/completion", get(stats::completion))
        .route("/stats/progress/daily", get(stats::daily_progress))
        .route("/stats/progress/weekly", get(stats::weekly_progress))
        .route("/stats/progress/course/{id}", get(stats::course_progress))
        .route("/stats/top-progress", get(stats::top_progress))
        .route("/crawl/history", get(crawl::history))
        .route("/auth/login", post(auth::login))
        .route(
            "/auth/settings",
            get(auth::get_settings).patch(auth::patch_settings),
        )
        .route("/resumes", get(resumes::list_resumes))
        .route("/resumes/upload", post(resumes::upload_resume))
        .route(
            "/resumes/{id}",
            get(resumes::get_resume).delete(resumes::delete_resume),
        )
        .route("/resumes/file/{id}", get(resumes::download_resume))
        .route("/crawler/{*path}", any(proxy::forward))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

/// Path ids arrive as strings so malformed ids produce the JSON 400 shape
/// instead of the extractor's plain-text rejection.
fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {what} ID")))
}
