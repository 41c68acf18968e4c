mod common;

use common::{seed_course, seed_lecture, send, test_app};
use serde_json::json;

#[tokio::test]
async fn list_courses_reports_recomputed_stats() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Rust 입문").await;
    seed_lecture(&pool, course_id, "Ownership", "30", true, 1).await;
    seed_lecture(&pool, course_id, "Borrowing", "45", false, 2).await;
    seed_lecture(&pool, course_id, "Lifetimes", "25", true, 3).await;

    let (status, body) = send(&app, "GET", "/courses", false, None).await;
    assert_eq!(status, 200);

    let course = &body.as_array().unwrap()[0];
    assert_eq!(course["course_id"], course_id);
    assert_eq!(course["study_time"], 55.0);
    assert_eq!(course["total_lecture_time"], 100.0);
    assert_eq!(course["remaining_time"], 45.0);
    assert_eq!(course["progress_rate"], 66.67);
    assert_eq!(course["lectures"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn course_detail_orders_lectures_and_parses_durations() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "SQL Basics").await;
    seed_lecture(&pool, course_id, "Joins", "20", false, 2).await;
    seed_lecture(&pool, course_id, "Select", "not-a-number", true, 1).await;

    let (status, body) = send(&app, "GET", &format!("/courses/{course_id}"), false, None).await;
    assert_eq!(status, 200);

    let lectures = body["lectures"].as_array().unwrap();
    assert_eq!(lectures[0]["lecture_title"], "Select");
    // unparseable duration coerces to zero
    assert_eq!(lectures[0]["lecture_time"], 0.0);
    assert_eq!(body["total_lecture_time"], 20.0);
    assert_eq!(body["progress_rate"], 50.0);
}

#[tokio::test]
async fn course_detail_rejects_bad_and_missing_ids() {
    let (app, _pool, _dir) = test_app().await;

    let (status, body) = send(&app, "GET", "/courses/abc", false, None).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("Invalid"));

    let (status, _) = send(&app, "GET", "/courses/999", false, None).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn search_tags_match_type_and_dedups() {
    let (app, pool, _dir) = test_app().await;
    let by_title = seed_course(&pool, "Docker Deep Dive").await;
    let by_lecture = seed_course(&pool, "Cloud Basics").await;
    let both = seed_course(&pool, "Docker Compose").await;
    seed_lecture(&pool, by_lecture, "Docker networking", "10", false, 1).await;
    seed_lecture(&pool, both, "Docker volumes", "10", false, 1).await;
    seed_lecture(&pool, by_title, "Images", "10", false, 1).await;

    let (status, body) = send(&app, "GET", "/courses/search?q=Docker", false, None).await;
    assert_eq!(status, 200);

    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    for hit in hits {
        let id = hit["course_id"].as_i64().unwrap();
        let match_type = hit["match_type"].as_str().unwrap();
        if id == by_title {
            assert_eq!(match_type, "course");
            assert!(hit["matched_lectures"].as_array().unwrap().is_empty());
        } else if id == by_lecture {
            assert_eq!(match_type, "lecture");
            assert_eq!(hit["matched_lectures"][0], "Docker networking");
        } else {
            assert_eq!(match_type, "both");
        }
    }
}

#[tokio::test]
async fn search_with_blank_query_returns_empty_list() {
    let (app, pool, _dir) = test_app().await;
    seed_course(&pool, "Anything").await;

    let (status, body) = send(&app, "GET", "/courses/search?q=", false, None).await;
    assert_eq!(status, 200);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = send(&app, "GET", "/courses/search", false, None).await;
    assert_eq!(status, 200);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn metadata_patch_requires_auth_fields_and_valid_priority() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Kubernetes").await;
    let uri = format!("/courses/{course_id}");

    let (status, _) = send(&app, "PATCH", &uri, false, Some(json!({"priority": 3}))).await;
    assert_eq!(status, 401);

    let (status, _) = send(&app, "PATCH", &uri, true, Some(json!({}))).await;
    assert_eq!(status, 400);

    let (status, _) = send(&app, "PATCH", &uri, true, Some(json!({"priority": 6}))).await;
    assert_eq!(status, 400);
    let (priority,): (i64,) = sqlx::query_as("SELECT priority FROM courses WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(priority, 0, "rejected patch must not touch the row");

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        true,
        Some(json!({"priority": 5, "category_depth1": "개발"})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn empty_category_string_clears_to_null_and_absent_leaves_unchanged() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Spring Boot").await;
    let uri = format!("/courses/{course_id}");

    let (status, _) = send(
        &app,
        "PATCH",
        &uri,
        true,
        Some(json!({"category_depth1": "개발", "category_depth2": "백엔드"})),
    )
    .await;
    assert_eq!(status, 200);

    // clear depth2 explicitly, leave depth1 untouched
    let (status, _) = send(&app, "PATCH", &uri, true, Some(json!({"category_depth2": ""}))).await;
    assert_eq!(status, 200);

    let (depth1, depth2): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT category_depth1, category_depth2 FROM courses WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(depth1.as_deref(), Some("개발"));
    assert_eq!(depth2, None);
}

#[tokio::test]
async fn visibility_and_manual_completion_toggles() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Terraform").await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/courses/{course_id}/visibility"),
        true,
        Some(json!({"is_visible_on_dashboard": false})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["is_visible_on_dashboard"], false);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/courses/{course_id}/manually-completed"),
        true,
        Some(json!({"is_manually_completed": true})),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["is_manually_completed"], true);
    assert!(body["message"].as_str().unwrap().contains("제외"));

    let (visible, manual): (bool, bool) = sqlx::query_as(
        "SELECT is_visible_on_dashboard, is_manually_completed FROM courses WHERE course_id = ?",
    )
    .bind(course_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(!visible);
    assert!(manual);
}

#[tokio::test]
async fn boolean_toggles_reject_missing_field_and_missing_course() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Go").await;

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/courses/{course_id}/visibility"),
        true,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send(
        &app,
        "PATCH",
        "/courses/4242/visibility",
        true,
        Some(json!({"is_visible_on_dashboard": true})),
    )
    .await;
    assert_eq!(status, 404);
}
