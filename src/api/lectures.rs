use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde_json::{Value, json};

use crate::auth;
use crate::db::repository;
use crate::error::AppError;
use crate::models::CompletionPatch;
use crate::progress::CourseStats;
use crate::state::AppState;

use super::parse_id;

/// Toggles a lecture's completion flag, then refreshes the parent course's
/// cached aggregate columns from the full lecture set.
pub async fn patch_lecture(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CompletionPatch>,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;
    let lecture_id = parse_id(&id, "lecture")?;
    let is_completed = body
        .is_completed
        .ok_or_else(|| AppError::BadRequest("is_completed must be a boolean".to_string()))?;

    let lecture = repository::find_lecture_by_id(&state.db, lecture_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Lecture not found".to_string()))?;

    repository::set_lecture_completed(&state.db, lecture_id, is_completed).await?;

    let facts = repository::fetch_lecture_facts(&state.db, lecture.course_id).await?;
    let stats = CourseStats::collect(
        facts
            .iter()
            .map(|f| (f.lecture_time.as_str(), f.is_completed)),
    );
    repository::update_course_stats_cache(
        &state.db,
        lecture.course_id,
        stats.total_lecture_time,
        stats.study_time,
        stats.progress_rate(),
    )
    .await?;

    let message = if is_completed {
        "강의를 완료로 표시했습니다."
    } else {
        "강의를 미완료로 표시했습니다."
    };
    Ok(Json(json!({
        "success": true,
        "lecture_id": lecture_id,
        "is_completed": is_completed,
        "message": message,
    })))
}
