#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use study_dashboard::api;
use study_dashboard::auth;
use study_dashboard::config::AppConfig;
use study_dashboard::crawler::NoopCrawlerClient;
use study_dashboard::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse";

/// Router + pool over a migrated in-memory database with a seeded admin.
/// The TempDir keeps the upload directory alive for the test's duration.
pub async fn test_app() -> (Router, SqlitePool, tempfile::TempDir) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    auth::ensure_admin_seed(&pool, TEST_PASSWORD)
        .await
        .expect("Failed to seed admin");

    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        crawler_api_url: "http://localhost:8000".to_string(),
        upload_dir: upload_dir.path().to_path_buf(),
        admin_password: TEST_PASSWORD.to_string(),
    };

    let state = AppState {
        db: pool.clone(),
        crawler: Arc::new(NoopCrawlerClient),
        config: Arc::new(config),
    };

    (api::router(state), pool, upload_dir)
}

pub fn bearer() -> String {
    format!("Bearer {TEST_PASSWORD}")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    authed: bool,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if authed {
        builder = builder.header("authorization", bearer());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn seed_course(pool: &SqlitePool, title: &str) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO courses (course_title, url, created_at, updated_at) VALUES (?, ?, ?, ?)",
    )
    .bind(title)
    .bind(format!("https://example.com/{}", title.replace(' ', "-")))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("Failed to insert course")
    .last_insert_rowid()
}

pub async fn seed_lecture(
    pool: &SqlitePool,
    course_id: i64,
    title: &str,
    minutes: &str,
    is_completed: bool,
    sort_order: i64,
) -> i64 {
    let completed_at = is_completed.then(|| chrono::Utc::now().to_rfc3339());
    sqlx::query(
        "INSERT INTO lectures \
         (course_id, section_title, lecture_title, lecture_time, is_completed, completed_at, sort_order) \
         VALUES (?, 'Section 1', ?, ?, ?, ?, ?)",
    )
    .bind(course_id)
    .bind(title)
    .bind(minutes)
    .bind(is_completed)
    .bind(completed_at)
    .bind(sort_order)
    .execute(pool)
    .await
    .expect("Failed to insert lecture")
    .last_insert_rowid()
}

pub async fn seed_snapshot(
    pool: &SqlitePool,
    course_id: i64,
    snapshot_date: &str,
    progress_rate: f64,
    study_time: f64,
) {
    sqlx::query(
        "INSERT INTO course_progress_snapshots (course_id, snapshot_date, progress_rate, study_time) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(course_id)
    .bind(snapshot_date)
    .bind(progress_rate)
    .bind(study_time)
    .execute(pool)
    .await
    .expect("Failed to insert snapshot");
}

pub async fn seed_crawl_log(pool: &SqlitePool, course_id: Option<i64>, status: &str) {
    sqlx::query("INSERT INTO crawl_logs (course_id, crawl_status) VALUES (?, ?)")
        .bind(course_id)
        .bind(status)
        .execute(pool)
        .await
        .expect("Failed to insert crawl log");
}
