mod common;

use common::{seed_course, seed_lecture, send, test_app};
use serde_json::json;
use sqlx::SqlitePool;

async fn target_count(pool: &SqlitePool) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM courses WHERE is_target_course = 1")
            .fetch_one(pool)
            .await
            .unwrap();
    count
}

#[tokio::test]
async fn set_target_computes_inclusive_quota() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "FastAPI").await;
    seed_lecture(&pool, course_id, "Intro", "181", false, 1).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/courses/{course_id}/set-target"),
        true,
        Some(json!({
            "target_start_date": "2024-01-01",
            "target_completion_date": "2024-01-10",
        })),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["study_days"], 10);
    assert_eq!(body["target_daily_minutes"], 19);
    assert_eq!(body["remaining_minutes"], 181.0);
    assert_eq!(target_count(&pool).await, 1);
}

#[tokio::test]
async fn set_target_rejects_bad_range_without_mutation() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Vue").await;
    seed_lecture(&pool, course_id, "Intro", "60", false, 1).await;

    for completion in ["2024-01-01", "2023-12-20"] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/courses/{course_id}/set-target"),
            true,
            Some(json!({
                "target_start_date": "2024-01-01",
                "target_completion_date": completion,
            })),
        )
        .await;
        assert_eq!(status, 400);
        assert!(body["error"].as_str().unwrap().contains("after start date"));
    }
    assert_eq!(target_count(&pool).await, 0);
}

#[tokio::test]
async fn set_target_rejects_completed_course() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Done Course").await;
    seed_lecture(&pool, course_id, "Only", "90", true, 1).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/courses/{course_id}/set-target"),
        true,
        Some(json!({
            "target_start_date": "2024-01-01",
            "target_completion_date": "2024-01-10",
        })),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("already completed"));
    assert_eq!(target_count(&pool).await, 0);
}

#[tokio::test]
async fn set_target_validates_inputs_and_existence() {
    let (app, _pool, _dir) = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/courses/999/set-target",
        true,
        Some(json!({
            "target_start_date": "2024-01-01",
            "target_completion_date": "2024-01-10",
        })),
    )
    .await;
    assert_eq!(status, 404);

    let (status, _) = send(
        &app,
        "POST",
        "/courses/1/set-target",
        true,
        Some(json!({ "target_start_date": "2024-01-01" })),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send(
        &app,
        "POST",
        "/courses/1/set-target",
        false,
        Some(json!({
            "target_start_date": "2024-01-01",
            "target_completion_date": "2024-01-10",
        })),
    )
    .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn replacing_target_keeps_single_target_invariant() {
    let (app, pool, _dir) = test_app().await;
    let first = seed_course(&pool, "First").await;
    let second = seed_course(&pool, "Second").await;
    seed_lecture(&pool, first, "A", "100", false, 1).await;
    seed_lecture(&pool, second, "B", "200", false, 1).await;

    let dates = json!({
        "target_start_date": "2024-02-01",
        "target_completion_date": "2024-02-05",
    });
    let (status, _) = send(
        &app,
        "POST",
        &format!("/courses/{first}/set-target"),
        true,
        Some(dates.clone()),
    )
    .await;
    assert_eq!(status, 200);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/courses/{second}/set-target"),
        true,
        Some(dates),
    )
    .await;
    assert_eq!(status, 200);

    assert_eq!(target_count(&pool).await, 1);
    let (goal_fields,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM courses WHERE course_id = ? AND target_start_date IS NULL \
         AND target_completion_date IS NULL AND target_daily_minutes IS NULL \
         AND target_set_at IS NULL",
    )
    .bind(first)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(goal_fields, 1, "old target's goal fields must be reset");

    let (status, body) = send(&app, "GET", "/courses/target", false, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["has_target"], true);
    assert_eq!(body["target_course"]["course_id"], second);
    assert_eq!(body["target_course"]["target_daily_minutes"], 40);
}

#[tokio::test]
async fn clear_target_resets_goal_and_404s_when_not_target() {
    let (app, pool, _dir) = test_app().await;
    let course_id = seed_course(&pool, "Clearable").await;
    seed_lecture(&pool, course_id, "A", "50", false, 1).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/courses/{course_id}/clear-target"),
        true,
        None,
    )
    .await;
    assert_eq!(status, 404, "not currently the target");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/courses/{course_id}/set-target"),
        true,
        Some(json!({
            "target_start_date": "2024-03-01",
            "target_completion_date": "2024-03-10",
        })),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/courses/{course_id}/clear-target"),
        true,
        None,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(target_count(&pool).await, 0);

    let (status, body) = send(&app, "GET", "/courses/target", false, None).await;
    assert_eq!(status, 200);
    assert_eq!(body["has_target"], false);
    assert!(body["target_course"].is_null());
}
