use serde::Serialize;
use sqlx::FromRow;

/// Latest daily snapshot for a course, written by the external rollup job
/// and read here only for diffing.
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub course_id: i64,
    pub snapshot_date: String,
    pub progress_rate: f64,
    pub study_time: f64,
}

/// Crawl log joined with its course title. The log table has no timestamp,
/// so recency is by log_id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CrawlLogEntry {
    pub log_id: i64,
    pub course_id: Option<i64>,
    pub course_title: Option<String>,
    pub status: String,
    pub error_message: Option<String>,
}

/// Per-course delta block on the crawl-history report.
#[derive(Debug, Clone, Serialize)]
pub struct CourseUpdate {
    pub course_id: i64,
    pub course_title: String,
    pub url: String,
    pub updated_at: String,
    pub current_progress: f64,
    pub previous_progress: f64,
    pub progress_change: f64,
    pub current_study_time: f64,
    pub previous_study_time: f64,
    pub study_time_change: f64,
    pub total_lecture_time: f64,
    pub snapshot_date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlHistorySummary {
    pub updated_courses: usize,
    pub crawl_count: i64,
    pub completed_today: usize,
    pub period_hours: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub total_courses: i64,
    pub avg_progress: f64,
    pub total_study_time: f64,
    pub total_lecture_time: f64,
    pub remaining_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionEstimate {
    pub remaining_minutes: f64,
    pub days_needed_3h: i64,
    pub days_1h_per_day: i64,
    pub days_2h_per_day: i64,
    pub days_3h_per_day: i64,
    pub days_5h_per_day: i64,
}

/// Leaderboard entry: courses whose progress moved since their last snapshot,
/// sorted by the delta.
#[derive(Debug, Clone, Serialize)]
pub struct TopProgressEntry {
    pub course_id: i64,
    pub course_title: String,
    pub url: String,
    pub current_progress: f64,
    pub previous_progress: f64,
    pub progress_change: f64,
    pub current_study_time: f64,
    pub previous_study_time: f64,
    pub study_time_change: f64,
    pub snapshot_date: Option<String>,
}
