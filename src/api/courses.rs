use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{
    CourseListItem, CoursePatch, CourseRow, LectureDetail, LectureFact, LectureSummary,
    ManuallyCompletedPatch, SearchResult, SetTargetRequest, TargetCourse, VisibilityPatch,
};
use crate::models::lecture::SearchLectureSummary;
use crate::progress::{self, CourseStats, GoalError};
use crate::state::AppState;

use super::parse_id;

fn stats_of(facts: &[LectureFact]) -> CourseStats {
    CourseStats::collect(
        facts
            .iter()
            .map(|f| (f.lecture_time.as_str(), f.is_completed)),
    )
}

fn group_by_course(facts: Vec<LectureFact>) -> HashMap<i64, Vec<LectureFact>> {
    let mut grouped: HashMap<i64, Vec<LectureFact>> = HashMap::new();
    for fact in facts {
        grouped.entry(fact.course_id).or_default().push(fact);
    }
    grouped
}

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseListItem>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    let facts = group_by_course(repository::fetch_all_lecture_facts(&state.db).await?);

    let empty: Vec<LectureFact> = Vec::new();
    let items = courses
        .into_iter()
        .map(|course| {
            let course_facts = facts.get(&course.course_id).unwrap_or(&empty);
            let stats = stats_of(course_facts);
            CourseListItem {
                course_id: course.course_id,
                course_title: course.course_title,
                url: course.url,
                created_at: course.created_at,
                updated_at: course.updated_at,
                is_manually_completed: course.is_manually_completed,
                is_visible_on_dashboard: course.is_visible_on_dashboard,
                lectures: course_facts
                    .iter()
                    .map(|f| LectureSummary {
                        section_title: f.section_title.clone(),
                        lecture_title: f.lecture_title.clone(),
                    })
                    .collect(),
                total_lecture_time: stats.total_lecture_time,
                study_time: stats.study_time,
                remaining_time: stats.remaining_time(),
                progress_rate: stats.progress_rate(),
            }
        })
        .collect();

    Ok(Json(items))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let course_id = parse_id(&id, "course")?;
    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let lectures = repository::fetch_lectures(&state.db, course_id).await?;
    let stats = CourseStats::collect(
        lectures
            .iter()
            .map(|l| (l.lecture_time.as_str(), l.is_completed)),
    );

    let lecture_list: Vec<LectureDetail> = lectures
        .into_iter()
        .map(|l| LectureDetail {
            lecture_id: l.lecture_id,
            course_id: l.course_id,
            section_number: l.section_number,
            section_title: l.section_title,
            chapter_number: l.chapter_number,
            chapter_title: l.chapter_title,
            lecture_number: l.lecture_number,
            lecture_title: l.lecture_title,
            lecture_time: progress::parse_minutes(&l.lecture_time),
            is_completed: l.is_completed,
            sort_order: l.sort_order,
        })
        .collect();

    Ok(Json(json!({
        "course_id": course.course_id,
        "course_title": course.course_title,
        "url": course.url,
        "created_at": course.created_at,
        "updated_at": course.updated_at,
        "is_manually_completed": course.is_manually_completed,
        "lectures": lecture_list,
        "total_lecture_time": stats.total_lecture_time,
        "study_time": stats.study_time,
        "remaining_time": stats.remaining_time(),
        "progress_rate": stats.progress_rate(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

pub async fn search_courses(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let term = format!("%{query}%");

    let title_hits = repository::search_courses_by_title(&state.db, &term).await?;
    let lecture_hits = repository::search_courses_by_lecture_title(&state.db, &term).await?;
    let matched_titles = repository::matched_lecture_titles(&state.db, &term).await?;

    let mut matched_by_course: HashMap<i64, Vec<String>> = HashMap::new();
    for (course_id, lecture_title) in matched_titles {
        matched_by_course
            .entry(course_id)
            .or_default()
            .push(lecture_title);
    }

    // Dedup by course, tagging how each one matched.
    let mut order: Vec<i64> = Vec::new();
    let mut merged: HashMap<i64, (CourseRow, String)> = HashMap::new();
    for course in title_hits {
        order.push(course.course_id);
        merged.insert(course.course_id, (course, "course".to_string()));
    }
    for course in lecture_hits {
        match merged.get_mut(&course.course_id) {
            Some((_, match_type)) => *match_type = "both".to_string(),
            None => {
                order.push(course.course_id);
                merged.insert(course.course_id, (course, "lecture".to_string()));
            }
        }
    }

    let facts = group_by_course(repository::fetch_all_lecture_facts(&state.db).await?);
    let empty: Vec<LectureFact> = Vec::new();

    let results = order
        .into_iter()
        .filter_map(|course_id| merged.remove(&course_id))
        .map(|(course, match_type)| {
            let course_facts = facts.get(&course.course_id).unwrap_or(&empty);
            let stats = stats_of(course_facts);
            SearchResult {
                course_id: course.course_id,
                course_title: course.course_title,
                url: course.url,
                created_at: course.created_at,
                updated_at: course.updated_at,
                is_manually_completed: course.is_manually_completed,
                is_visible_on_dashboard: course.is_visible_on_dashboard,
                priority: course.priority,
                category_depth1: course.category_depth1,
                category_depth2: course.category_depth2,
                category_depth3: course.category_depth3,
                match_type,
                matched_lectures: matched_by_course
                    .get(&course.course_id)
                    .cloned()
                    .unwrap_or_default(),
                lectures: course_facts
                    .iter()
                    .map(|f| SearchLectureSummary {
                        section_title: f.section_title.clone(),
                        lecture_title: f.lecture_title.clone(),
                        lecture_time: progress::parse_minutes(&f.lecture_time),
                        is_completed: f.is_completed,
                    })
                    .collect(),
                total_lecture_time: stats.total_lecture_time,
                study_time: stats.study_time,
                remaining_time: stats.remaining_time(),
                progress_rate: stats.progress_rate(),
            }
        })
        .collect();

    Ok(Json(results))
}

pub async fn patch_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<CoursePatch>,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;
    let course_id = parse_id(&id, "course")?;

    if patch.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    if let Some(priority) = patch.priority {
        if !(0..=5).contains(&priority) {
            return Err(AppError::BadRequest(
                "priority must be an integer between 0 and 5".to_string(),
            ));
        }
    }

    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    repository::apply_course_patch(&state.db, &course, &patch).await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn patch_visibility(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<VisibilityPatch>,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;
    let course_id = parse_id(&id, "course")?;
    let visible = body.is_visible_on_dashboard.ok_or_else(|| {
        AppError::BadRequest("is_visible_on_dashboard must be a boolean".to_string())
    })?;

    repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    repository::update_visibility(&state.db, course_id, visible).await?;

    Ok(Json(json!({
        "success": true,
        "course_id": course_id,
        "is_visible_on_dashboard": visible,
        "message": if visible { "대시보드에 표시됩니다." } else { "대시보드에서 숨겨집니다." },
    })))
}

pub async fn patch_manually_completed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ManuallyCompletedPatch>,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;
    let course_id = parse_id(&id, "course")?;
    let completed = body.is_manually_completed.ok_or_else(|| {
        AppError::BadRequest("is_manually_completed must be a boolean".to_string())
    })?;

    repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    repository::update_manually_completed(&state.db, course_id, completed).await?;

    let message = if completed {
        "강의 크롤링 제외 처리되었습니다."
    } else {
        "강의 크롤링 포함 처리되었습니다."
    };
    Ok(Json(json!({
        "success": true,
        "course_id": course_id,
        "is_manually_completed": completed,
        "message": message,
    })))
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{field} must be a YYYY-MM-DD date")))
}

pub async fn set_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SetTargetRequest>,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;
    let course_id = parse_id(&id, "course")?;

    let (Some(start_raw), Some(completion_raw)) =
        (body.target_start_date, body.target_completion_date)
    else {
        return Err(AppError::BadRequest(
            "target_start_date and target_completion_date are required".to_string(),
        ));
    };

    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

    let start_date = parse_date(&start_raw, "target_start_date")?;
    let completion_date = parse_date(&completion_raw, "target_completion_date")?;

    let facts = repository::fetch_lecture_facts(&state.db, course_id).await?;
    let remaining_minutes = stats_of(&facts).remaining_time();

    let plan = progress::plan_goal(remaining_minutes, start_date, completion_date).map_err(
        |e| match e {
            GoalError::InvalidRange => {
                AppError::BadRequest("Completion date must be after start date".to_string())
            }
            GoalError::AlreadyComplete => {
                AppError::BadRequest("This course is already completed".to_string())
            }
        },
    )?;

    repository::set_target_course(
        &state.db,
        course_id,
        &start_raw,
        &completion_raw,
        plan.daily_minutes,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "course_id": course_id,
        "course_title": course.course_title,
        "target_start_date": start_raw,
        "target_completion_date": completion_raw,
        "remaining_minutes": remaining_minutes,
        "study_days": plan.study_days,
        "target_daily_minutes": plan.daily_minutes,
        "message": "목표 강의가 설정되었습니다.",
    })))
}

pub async fn clear_target(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    auth::require_auth(&state.db, &headers).await?;
    let course_id = parse_id(&id, "course")?;

    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("This course is not set as target".to_string()))?;

    if !repository::clear_target_course(&state.db, course_id).await? {
        return Err(AppError::NotFound(
            "This course is not set as target".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "course_id": course_id,
        "course_title": course.course_title,
        "message": "목표 강의가 해제되었습니다.",
    })))
}

pub async fn get_target(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let Some(course) = repository::find_target_course(&state.db).await? else {
        return Ok(Json(json!({ "has_target": false, "target_course": null })));
    };

    let facts = repository::fetch_lecture_facts(&state.db, course.course_id).await?;
    let stats = stats_of(&facts);

    // Dashboard displays the target's progress at one decimal place.
    let progress_rate = if stats.total_count == 0 {
        0.0
    } else {
        progress::round1(stats.completed_count as f64 / stats.total_count as f64 * 100.0)
    };

    let target = TargetCourse {
        course_id: course.course_id,
        course_title: course.course_title,
        url: course.url,
        target_start_date: course.target_start_date.unwrap_or_default(),
        target_completion_date: course.target_completion_date.unwrap_or_default(),
        target_daily_minutes: course.target_daily_minutes.unwrap_or(0),
        target_set_at: course.target_set_at.unwrap_or_default(),
        total_lecture_time: stats.total_lecture_time,
        study_time: stats.study_time,
        remaining_time: stats.remaining_time(),
        progress_rate,
    };

    Ok(Json(json!({ "has_target": true, "target_course": target })))
}
