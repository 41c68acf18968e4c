use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A lecture row as stored. `lecture_time` keeps the raw crawled text;
/// parsing happens in the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LectureRow {
    pub lecture_id: i64,
    pub course_id: i64,
    pub section_number: Option<i64>,
    pub section_title: String,
    pub chapter_number: Option<i64>,
    pub chapter_title: Option<String>,
    pub lecture_number: Option<i64>,
    pub lecture_title: String,
    pub lecture_time: String,
    pub is_completed: bool,
    pub completed_at: Option<String>,
    pub sort_order: i64,
}

/// The slice of a lecture the aggregation engine needs. Fetched in bulk,
/// ordered by (course_id, sort_order), so one scan serves every course.
#[derive(Debug, Clone, FromRow)]
pub struct LectureFact {
    pub course_id: i64,
    pub section_title: String,
    pub lecture_title: String,
    pub lecture_time: String,
    pub is_completed: bool,
}

/// Title-only lecture entry on the course list.
#[derive(Debug, Clone, Serialize)]
pub struct LectureSummary {
    pub section_title: String,
    pub lecture_title: String,
}

/// Lecture entry on search hits, which also carry duration and state.
#[derive(Debug, Clone, Serialize)]
pub struct SearchLectureSummary {
    pub section_title: String,
    pub lecture_title: String,
    pub lecture_time: f64,
    pub is_completed: bool,
}

/// Full lecture on the course detail view, with its duration parsed.
#[derive(Debug, Clone, Serialize)]
pub struct LectureDetail {
    pub lecture_id: i64,
    pub course_id: i64,
    pub section_number: Option<i64>,
    pub section_title: String,
    pub chapter_number: Option<i64>,
    pub chapter_title: Option<String>,
    pub lecture_number: Option<i64>,
    pub lecture_title: String,
    pub lecture_time: f64,
    pub is_completed: bool,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionPatch {
    pub is_completed: Option<bool>,
}

/// A lecture completed today, joined with its course title for the
/// crawl-history report.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompletedLectureRow {
    pub lecture_id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub section_title: String,
    pub lecture_title: String,
    pub lecture_time: String,
    pub completed_at: Option<String>,
}
