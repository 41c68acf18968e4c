use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{
    AdminAuthRow, CompletedLectureRow, CoursePatch, CourseRow, CrawlLogEntry, LectureFact,
    LectureRow, ResumeRow, SnapshotRow,
};

const COURSE_COLUMNS: &str = "course_id, course_title, url, created_at, updated_at, \
     is_manually_completed, is_visible_on_dashboard, priority, \
     category_depth1, category_depth2, category_depth3, \
     is_target_course, target_start_date, target_completion_date, \
     target_daily_minutes, target_set_at";

const LECTURE_COLUMNS: &str = "lecture_id, course_id, section_number, section_title, \
     chapter_number, chapter_title, lecture_number, lecture_title, \
     lecture_time, is_completed, completed_at, sort_order";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY updated_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_course_by_id(
    db: &SqlitePool,
    course_id: i64,
) -> Result<Option<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = ?"
    ))
    .bind(course_id)
    .fetch_optional(db)
    .await
}

pub async fn find_target_course(db: &SqlitePool) -> Result<Option<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE is_target_course = 1 LIMIT 1"
    ))
    .fetch_optional(db)
    .await
}

pub async fn search_courses_by_title(
    db: &SqlitePool,
    term: &str,
) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE course_title LIKE ? ORDER BY updated_at DESC"
    ))
    .bind(term)
    .fetch_all(db)
    .await
}

pub async fn search_courses_by_lecture_title(
    db: &SqlitePool,
    term: &str,
) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT DISTINCT {COURSE_COLUMNS} FROM courses \
         WHERE course_id IN (SELECT course_id FROM lectures WHERE lecture_title LIKE ?) \
         ORDER BY updated_at DESC"
    ))
    .bind(term)
    .fetch_all(db)
    .await
}

/// Lecture titles matching a search term, grouped client-side by course.
pub async fn matched_lecture_titles(
    db: &SqlitePool,
    term: &str,
) -> Result<Vec<(i64, String)>, sqlx::Error> {
    let rows: Vec<(i64, String)> = sqlx::query_as(
        "SELECT course_id, lecture_title FROM lectures \
         WHERE lecture_title LIKE ? ORDER BY course_id, sort_order",
    )
    .bind(term)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn courses_updated_since(
    db: &SqlitePool,
    cutoff: &str,
) -> Result<Vec<CourseRow>, sqlx::Error> {
    sqlx::query_as::<_, CourseRow>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE updated_at >= ? ORDER BY updated_at DESC"
    ))
    .bind(cutoff)
    .fetch_all(db)
    .await
}

pub async fn fetch_lectures(
    db: &SqlitePool,
    course_id: i64,
) -> Result<Vec<LectureRow>, sqlx::Error> {
    sqlx::query_as::<_, LectureRow>(&format!(
        "SELECT {LECTURE_COLUMNS} FROM lectures WHERE course_id = ? ORDER BY sort_order"
    ))
    .bind(course_id)
    .fetch_all(db)
    .await
}

pub async fn find_lecture_by_id(
    db: &SqlitePool,
    lecture_id: i64,
) -> Result<Option<LectureRow>, sqlx::Error> {
    sqlx::query_as::<_, LectureRow>(&format!(
        "SELECT {LECTURE_COLUMNS} FROM lectures WHERE lecture_id = ?"
    ))
    .bind(lecture_id)
    .fetch_optional(db)
    .await
}

/// One bulk scan of every lecture, ordered so per-course grouping is a
/// single pass. Shared by the list, search and stats endpoints.
pub async fn fetch_all_lecture_facts(db: &SqlitePool) -> Result<Vec<LectureFact>, sqlx::Error> {
    sqlx::query_as::<_, LectureFact>(
        "SELECT course_id, section_title, lecture_title, lecture_time, is_completed \
         FROM lectures ORDER BY course_id, sort_order",
    )
    .fetch_all(db)
    .await
}

pub async fn fetch_lecture_facts(
    db: &SqlitePool,
    course_id: i64,
) -> Result<Vec<LectureFact>, sqlx::Error> {
    sqlx::query_as::<_, LectureFact>(
        "SELECT course_id, section_title, lecture_title, lecture_time, is_completed \
         FROM lectures WHERE course_id = ? ORDER BY sort_order",
    )
    .bind(course_id)
    .fetch_all(db)
    .await
}

pub async fn update_visibility(
    db: &SqlitePool,
    course_id: i64,
    visible: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE courses SET is_visible_on_dashboard = ?, updated_at = ? WHERE course_id = ?")
        .bind(visible)
        .bind(now_rfc3339())
        .bind(course_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn update_manually_completed(
    db: &SqlitePool,
    course_id: i64,
    completed: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE courses SET is_manually_completed = ?, updated_at = ? WHERE course_id = ?")
        .bind(completed)
        .bind(now_rfc3339())
        .bind(course_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Applies a metadata patch to a fetched row and writes all patched columns
/// back in one parameterized statement. Empty category strings persist as
/// NULL (explicit clear).
pub async fn apply_course_patch(
    db: &SqlitePool,
    current: &CourseRow,
    patch: &CoursePatch,
) -> Result<(), sqlx::Error> {
    let priority = patch.priority.unwrap_or(current.priority);
    let normalize = |supplied: &Option<String>, current: &Option<String>| match supplied {
        Some(value) if value.is_empty() => None,
        Some(value) => Some(value.clone()),
        None => current.clone(),
    };
    let depth1 = normalize(&patch.category_depth1, &current.category_depth1);
    let depth2 = normalize(&patch.category_depth2, &current.category_depth2);
    let depth3 = normalize(&patch.category_depth3, &current.category_depth3);

    sqlx::query(
        "UPDATE courses SET priority = ?, category_depth1 = ?, category_depth2 = ?, \
         category_depth3 = ?, updated_at = ? WHERE course_id = ?",
    )
    .bind(priority)
    .bind(depth1)
    .bind(depth2)
    .bind(depth3)
    .bind(now_rfc3339())
    .bind(current.course_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Clears the previous target and sets the new one in a single transaction,
/// upholding the at-most-one-target invariant under concurrent calls.
pub async fn set_target_course(
    db: &SqlitePool,
    course_id: i64,
    start_date: &str,
    completion_date: &str,
    daily_minutes: i64,
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    sqlx::query(
        "UPDATE courses SET is_target_course = 0, target_start_date = NULL, \
         target_completion_date = NULL, target_daily_minutes = NULL, target_set_at = NULL \
         WHERE is_target_course = 1",
    )
    .execute(&mut *tx)
    .await?;

    let now = now_rfc3339();
    sqlx::query(
        "UPDATE courses SET is_target_course = 1, target_start_date = ?, \
         target_completion_date = ?, target_daily_minutes = ?, target_set_at = ?, \
         updated_at = ? WHERE course_id = ?",
    )
    .bind(start_date)
    .bind(completion_date)
    .bind(daily_minutes)
    .bind(&now)
    .bind(&now)
    .bind(course_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}

/// Unsets the goal on a course. Returns false when it was not the target.
pub async fn clear_target_course(db: &SqlitePool, course_id: i64) -> Result<bool, sqlx::Error> {
    let rows = sqlx::query(
        "UPDATE courses SET is_target_course = 0, target_start_date = NULL, \
         target_completion_date = NULL, target_daily_minutes = NULL, target_set_at = NULL, \
         updated_at = ? WHERE course_id = ? AND is_target_course = 1",
    )
    .bind(now_rfc3339())
    .bind(course_id)
    .execute(db)
    .await?
    .rows_affected();
    Ok(rows > 0)
}

pub async fn set_lecture_completed(
    db: &SqlitePool,
    lecture_id: i64,
    is_completed: bool,
) -> Result<(), sqlx::Error> {
    let completed_at = is_completed.then(now_rfc3339);
    sqlx::query("UPDATE lectures SET is_completed = ?, completed_at = ? WHERE lecture_id = ?")
        .bind(is_completed)
        .bind(completed_at)
        .bind(lecture_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Write-through cache refresh on the parent course after a lecture toggle.
pub async fn update_course_stats_cache(
    db: &SqlitePool,
    course_id: i64,
    total_lecture_time: f64,
    study_time: f64,
    progress_rate: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE courses SET total_lecture_time = ?, study_time = ?, progress_rate = ?, \
         updated_at = ? WHERE course_id = ?",
    )
    .bind(total_lecture_time)
    .bind(study_time)
    .bind(progress_rate)
    .bind(now_rfc3339())
    .bind(course_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Latest snapshot per course dated strictly before `today` (YYYY-MM-DD).
pub async fn latest_snapshots_before(
    db: &SqlitePool,
    today: &str,
) -> Result<Vec<SnapshotRow>, sqlx::Error> {
    sqlx::query_as::<_, SnapshotRow>(
        "SELECT s.course_id, s.snapshot_date, s.progress_rate, s.study_time \
         FROM course_progress_snapshots s \
         JOIN (SELECT course_id, MAX(snapshot_date) AS latest \
               FROM course_progress_snapshots WHERE snapshot_date < ? \
               GROUP BY course_id) m \
           ON s.course_id = m.course_id AND s.snapshot_date = m.latest",
    )
    .bind(today)
    .fetch_all(db)
    .await
}

pub async fn recent_crawl_logs(
    db: &SqlitePool,
    limit: i64,
) -> Result<Vec<CrawlLogEntry>, sqlx::Error> {
    sqlx::query_as::<_, CrawlLogEntry>(
        "SELECT cl.log_id, cl.course_id, c.course_title, cl.crawl_status AS status, \
         cl.error_message \
         FROM crawl_logs cl LEFT JOIN courses c ON cl.course_id = c.course_id \
         ORDER BY cl.log_id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(db)
    .await
}

pub async fn crawl_log_count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM crawl_logs")
        .fetch_one(db)
        .await?;
    Ok(count)
}

/// Lectures completed on or after `cutoff`, newest first, with course titles.
pub async fn lectures_completed_since(
    db: &SqlitePool,
    cutoff: &str,
) -> Result<Vec<CompletedLectureRow>, sqlx::Error> {
    sqlx::query_as::<_, CompletedLectureRow>(
        "SELECT l.lecture_id, l.course_id, c.course_title, l.section_title, \
         l.lecture_title, l.lecture_time, l.completed_at \
         FROM lectures l JOIN courses c ON l.course_id = c.course_id \
         WHERE l.is_completed = 1 AND l.completed_at >= ? \
         ORDER BY l.completed_at DESC",
    )
    .bind(cutoff)
    .fetch_all(db)
    .await
}

/// (completed_at, lecture_time) pairs for completed lectures, optionally
/// restricted to one course. Feeds the history bucketing in `progress`.
pub async fn completion_records(
    db: &SqlitePool,
    course_id: Option<i64>,
) -> Result<Vec<(String, String)>, sqlx::Error> {
    let rows: Vec<(String, String)> = match course_id {
        Some(id) => {
            sqlx::query_as(
                "SELECT completed_at, lecture_time FROM lectures \
                 WHERE course_id = ? AND is_completed = 1 AND completed_at IS NOT NULL",
            )
            .bind(id)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT completed_at, lecture_time FROM lectures \
                 WHERE is_completed = 1 AND completed_at IS NOT NULL",
            )
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn fetch_resumes(db: &SqlitePool) -> Result<Vec<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "SELECT id, file_name, original_name, file_type, file_size, file_path, uploaded_at \
         FROM resumes ORDER BY uploaded_at DESC",
    )
    .fetch_all(db)
    .await
}

pub async fn find_resume_by_id(
    db: &SqlitePool,
    id: i64,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRow>(
        "SELECT id, file_name, original_name, file_type, file_size, file_path, uploaded_at \
         FROM resumes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_resume(
    db: &SqlitePool,
    file_name: &str,
    original_name: &str,
    file_type: &str,
    file_size: i64,
    file_path: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO resumes (file_name, original_name, file_type, file_size, file_path, uploaded_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(file_name)
    .bind(original_name)
    .bind(file_type)
    .bind(file_size)
    .bind(file_path)
    .bind(now_rfc3339())
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_resume(db: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM resumes WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn latest_admin(db: &SqlitePool) -> Result<Option<AdminAuthRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminAuthRow>(
        "SELECT id, password_hash, salt, hide_completed_lectures \
         FROM admin_auth ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(db)
    .await
}

pub async fn replace_admin(
    db: &SqlitePool,
    password_hash: &str,
    salt: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM admin_auth").execute(&mut *tx).await?;
    sqlx::query("INSERT INTO admin_auth (password_hash, salt) VALUES (?, ?)")
        .bind(password_hash)
        .bind(salt)
        .execute(&mut *tx)
        .await?;
    tx.commit().await
}

pub async fn update_admin_settings(
    db: &SqlitePool,
    hide_completed_lectures: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE admin_auth SET hide_completed_lectures = ? \
         WHERE id = (SELECT MAX(id) FROM admin_auth)",
    )
    .bind(hide_completed_lectures)
    .execute(db)
    .await?;
    Ok(())
}
