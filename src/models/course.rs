use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::lecture::LectureSummary;

/// A course row as stored. Crawler-owned columns plus the flags, category
/// labels and goal fields this service edits. The cached aggregate columns
/// are deliberately not mapped here; responses recompute from lectures.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseRow {
    pub course_id: i64,
    pub course_title: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_manually_completed: bool,
    pub is_visible_on_dashboard: bool,
    pub priority: i64,
    pub category_depth1: Option<String>,
    pub category_depth2: Option<String>,
    pub category_depth3: Option<String>,
    pub is_target_course: bool,
    pub target_start_date: Option<String>,
    pub target_completion_date: Option<String>,
    pub target_daily_minutes: Option<i64>,
    pub target_set_at: Option<String>,
}

/// Course list entry: metadata, lecture title summaries and recomputed stats.
#[derive(Debug, Clone, Serialize)]
pub struct CourseListItem {
    pub course_id: i64,
    pub course_title: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_manually_completed: bool,
    pub is_visible_on_dashboard: bool,
    pub lectures: Vec<LectureSummary>,
    pub total_lecture_time: f64,
    pub study_time: f64,
    pub remaining_time: f64,
    pub progress_rate: f64,
}

/// Search hit: a course plus how it matched (`course`, `lecture`, `both`)
/// and which lecture titles matched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub course_id: i64,
    pub course_title: String,
    pub url: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_manually_completed: bool,
    pub is_visible_on_dashboard: bool,
    pub priority: i64,
    pub category_depth1: Option<String>,
    pub category_depth2: Option<String>,
    pub category_depth3: Option<String>,
    pub match_type: String,
    pub matched_lectures: Vec<String>,
    pub lectures: Vec<crate::models::lecture::SearchLectureSummary>,
    pub total_lecture_time: f64,
    pub study_time: f64,
    pub remaining_time: f64,
    pub progress_rate: f64,
}

/// The current goal course with its plan and recomputed stats.
#[derive(Debug, Clone, Serialize)]
pub struct TargetCourse {
    pub course_id: i64,
    pub course_title: String,
    pub url: String,
    pub target_start_date: String,
    pub target_completion_date: String,
    pub target_daily_minutes: i64,
    pub target_set_at: String,
    pub total_lecture_time: f64,
    pub study_time: f64,
    pub remaining_time: f64,
    pub progress_rate: f64,
}

/// Field-level PATCH body for course metadata. Absent fields stay unchanged;
/// an empty category string clears the column to NULL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursePatch {
    pub priority: Option<i64>,
    pub category_depth1: Option<String>,
    pub category_depth2: Option<String>,
    pub category_depth3: Option<String>,
}

impl CoursePatch {
    pub fn is_empty(&self) -> bool {
        self.priority.is_none()
            && self.category_depth1.is_none()
            && self.category_depth2.is_none()
            && self.category_depth3.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisibilityPatch {
    pub is_visible_on_dashboard: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManuallyCompletedPatch {
    pub is_manually_completed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTargetRequest {
    pub target_start_date: Option<String>,
    pub target_completion_date: Option<String>,
}
