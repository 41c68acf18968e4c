use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{CompletionEstimate, LectureFact, SummaryStats, TopProgressEntry};
use crate::progress::{self, CompletionEvent, CourseStats};
use crate::state::AppState;

use super::parse_id;

fn stats_of(facts: &[LectureFact]) -> CourseStats {
    CourseStats::collect(
        facts
            .iter()
            .map(|f| (f.lecture_time.as_str(), f.is_completed)),
    )
}

/// Recomputed stats for every course from one lecture scan.
async fn per_course_stats(db: &SqlitePool) -> Result<HashMap<i64, CourseStats>, AppError> {
    let mut grouped: HashMap<i64, Vec<LectureFact>> = HashMap::new();
    for fact in repository::fetch_all_lecture_facts(db).await? {
        grouped.entry(fact.course_id).or_default().push(fact);
    }
    Ok(grouped
        .into_iter()
        .map(|(course_id, facts)| (course_id, stats_of(&facts)))
        .collect())
}

pub async fn summary(State(state): State<AppState>) -> Result<Json<SummaryStats>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    let stats = per_course_stats(&state.db).await?;

    let total_courses = courses.len() as i64;
    let mut total_study_time = 0.0;
    let mut total_lecture_time = 0.0;
    let mut rate_sum = 0.0;
    for course in &courses {
        let s = stats.get(&course.course_id).copied().unwrap_or_default();
        total_study_time += s.study_time;
        total_lecture_time += s.total_lecture_time;
        rate_sum += s.progress_rate();
    }
    let avg_progress = if total_courses > 0 {
        progress::round2(rate_sum / total_courses as f64)
    } else {
        0.0
    };

    Ok(Json(SummaryStats {
        total_courses,
        avg_progress,
        total_study_time,
        total_lecture_time,
        remaining_time: total_lecture_time - total_study_time,
    }))
}

pub async fn completion(
    State(state): State<AppState>,
) -> Result<Json<CompletionEstimate>, AppError> {
    let facts = repository::fetch_all_lecture_facts(&state.db).await?;
    let remaining_minutes = stats_of(&facts).remaining_time();

    Ok(Json(CompletionEstimate {
        remaining_minutes,
        days_needed_3h: (remaining_minutes / 180.0).ceil() as i64,
        days_1h_per_day: (remaining_minutes / 60.0).round() as i64,
        days_2h_per_day: (remaining_minutes / 120.0).round() as i64,
        days_3h_per_day: (remaining_minutes / 180.0).round() as i64,
        days_5h_per_day: (remaining_minutes / 300.0).round() as i64,
    }))
}

/// Completed-lecture rows reduced to (date, minutes) events for bucketing.
fn completion_events(records: Vec<(String, String)>) -> Vec<CompletionEvent> {
    records
        .into_iter()
        .filter_map(|(completed_at, lecture_time)| {
            let date = completed_at.get(..10)?;
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            Some(CompletionEvent {
                date,
                minutes: progress::parse_minutes(&lecture_time),
            })
        })
        .collect()
}

pub async fn daily_progress(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let events = completion_events(repository::completion_records(&state.db, None).await?);
    let since = Utc::now().date_naive() - Duration::days(30);
    Ok(Json(
        json!({ "daily_progress": progress::daily_buckets(&events, since) }),
    ))
}

pub async fn weekly_progress(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let events = completion_events(repository::completion_records(&state.db, None).await?);
    let since = Utc::now().date_naive() - Duration::weeks(12);
    Ok(Json(
        json!({ "weekly_progress": progress::weekly_buckets(&events, since) }),
    ))
}

pub async fn course_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let course_id = parse_id(&id, "course")?;
    let events =
        completion_events(repository::completion_records(&state.db, Some(course_id)).await?);
    Ok(Json(json!({
        "course_id": course_id,
        "progress_history": progress::course_history(&events),
    })))
}

pub async fn top_progress(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopProgressEntry>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    let stats = per_course_stats(&state.db).await?;

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let snapshots: HashMap<i64, _> = repository::latest_snapshots_before(&state.db, &today)
        .await?
        .into_iter()
        .map(|s| (s.course_id, s))
        .collect();

    let mut entries: Vec<TopProgressEntry> = courses
        .into_iter()
        .filter_map(|course| {
            let s = stats.get(&course.course_id).copied().unwrap_or_default();
            let snapshot = snapshots.get(&course.course_id);
            let delta = progress::diff_against_snapshot(
                s.progress_rate(),
                s.study_time,
                snapshot.map(|snap| (snap.progress_rate, snap.study_time)),
            );
            if delta.progress_change <= 0.0 {
                return None;
            }
            Some(TopProgressEntry {
                course_id: course.course_id,
                course_title: course.course_title,
                url: course.url,
                current_progress: s.progress_rate(),
                previous_progress: delta.previous_progress,
                progress_change: delta.progress_change,
                current_study_time: s.study_time,
                previous_study_time: delta.previous_study_time,
                study_time_change: delta.study_time_change,
                snapshot_date: snapshot.map(|snap| snap.snapshot_date.clone()),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.progress_change
            .partial_cmp(&a.progress_change)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Json(entries))
}
