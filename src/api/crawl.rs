use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{CourseUpdate, CrawlHistorySummary, LectureFact};
use crate::progress::{self, CourseStats};
use crate::state::AppState;

const CRAWL_LOG_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub hours: Option<i64>,
}

/// Lookback report: which courses changed versus their last snapshot, recent
/// crawl attempts, and everything completed today.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, AppError> {
    let hours = params.hours.unwrap_or(24);
    let now = Utc::now();
    let cutoff = (now - Duration::hours(hours)).to_rfc3339();
    let today = now.date_naive().format("%Y-%m-%d").to_string();

    let updated_courses = repository::courses_updated_since(&state.db, &cutoff).await?;
    let snapshots: HashMap<i64, _> = repository::latest_snapshots_before(&state.db, &today)
        .await?
        .into_iter()
        .map(|s| (s.course_id, s))
        .collect();

    let mut updates: Vec<CourseUpdate> = Vec::with_capacity(updated_courses.len());
    for course in updated_courses {
        let facts: Vec<LectureFact> =
            repository::fetch_lecture_facts(&state.db, course.course_id).await?;
        let stats = CourseStats::collect(
            facts
                .iter()
                .map(|f| (f.lecture_time.as_str(), f.is_completed)),
        );
        let snapshot = snapshots.get(&course.course_id);
        let delta = progress::diff_against_snapshot(
            stats.progress_rate(),
            stats.study_time,
            snapshot.map(|s| (s.progress_rate, s.study_time)),
        );
        updates.push(CourseUpdate {
            course_id: course.course_id,
            course_title: course.course_title,
            url: course.url,
            updated_at: course.updated_at,
            current_progress: stats.progress_rate(),
            previous_progress: delta.previous_progress,
            progress_change: delta.progress_change,
            current_study_time: stats.study_time,
            previous_study_time: delta.previous_study_time,
            study_time_change: delta.study_time_change,
            total_lecture_time: stats.total_lecture_time,
            snapshot_date: snapshot.map(|s| s.snapshot_date.clone()),
        });
    }

    let crawl_logs = repository::recent_crawl_logs(&state.db, CRAWL_LOG_LIMIT).await?;
    let crawl_count = repository::crawl_log_count(&state.db).await?;

    let completed_today: Vec<Value> = repository::lectures_completed_since(&state.db, &today)
        .await?
        .into_iter()
        .map(|l| {
            json!({
                "lecture_id": l.lecture_id,
                "course_id": l.course_id,
                "course_title": l.course_title,
                "section_title": l.section_title,
                "lecture_title": l.lecture_title,
                "lecture_time": progress::parse_minutes(&l.lecture_time),
                "completed_at": l.completed_at,
            })
        })
        .collect();

    let summary = CrawlHistorySummary {
        updated_courses: updates.len(),
        crawl_count,
        completed_today: completed_today.len(),
        period_hours: hours,
    };

    Ok(Json(json!({
        "summary": summary,
        "updates": updates,
        "crawl_logs": crawl_logs,
        "completed_today": completed_today,
    })))
}
