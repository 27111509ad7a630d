//! Integration tests for the `/progress-requests` endpoints: atomic
//! creation, defaulting, terminal-state errors, and the read-time
//! overdue view.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, SecondsFormat, Utc};
use common::{body_json, get, post_empty, post_json, seed_ticket, seed_user};
use sqlx::PgPool;

fn iso(ts: chrono::DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

async fn table_count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Test: creation targets the ticket owner by default
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_defaults_target_to_ticket_owner(pool: PgPool) {
    let supervisor = seed_user(&pool, "supervisor").await;
    let owner = seed_user(&pool, "owner").await;
    let ticket = seed_ticket(&pool, "TCK-500", owner).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        &app,
        "/api/v1/progress-requests",
        supervisor,
        serde_json::json!({
            "ticket_id": ticket,
            "message": "How is this looking?",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["target_user_id"], owner);
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["effective_status"], "pending");
    assert!(!json["data"]["notification_id"].is_null());
    assert!(!json["data"]["due_date"].is_null());

    // The spawned notification is targeted and actionable.
    assert_eq!(table_count(&pool, "notifications").await, 1);
}

// ---------------------------------------------------------------------------
// Test: a missing ticket fails with 404 and writes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_for_missing_ticket_writes_nothing(pool: PgPool) {
    let supervisor = seed_user(&pool, "supervisor").await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        &app,
        "/api/v1/progress-requests",
        supervisor,
        serde_json::json!({ "ticket_id": 4242 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(table_count(&pool, "progress_requests").await, 0);
    assert_eq!(table_count(&pool, "notifications").await, 0);
}

// ---------------------------------------------------------------------------
// Test: a missing target user fails with 404 and writes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_for_missing_target_writes_nothing(pool: PgPool) {
    let supervisor = seed_user(&pool, "supervisor").await;
    let ticket = seed_ticket(&pool, "TCK-501", supervisor).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json(
        &app,
        "/api/v1/progress-requests",
        supervisor,
        serde_json::json!({ "ticket_id": ticket, "target_user_id": 4242 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(table_count(&pool, "progress_requests").await, 0);
    assert_eq!(table_count(&pool, "notifications").await, 0);
}

// ---------------------------------------------------------------------------
// Test: respond stamps the request; repeats are invalid-state errors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn respond_then_second_respond_conflicts(pool: PgPool) {
    let supervisor = seed_user(&pool, "supervisor").await;
    let owner = seed_user(&pool, "owner").await;
    let ticket = seed_ticket(&pool, "TCK-502", owner).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/progress-requests",
        supervisor,
        serde_json::json!({ "ticket_id": ticket }),
    )
    .await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        &format!("/api/v1/progress-requests/{request_id}/respond"),
        owner,
        serde_json::json!({
            "progress_info": "Valve replaced, waiting on parts",
            "progress_percentage": 60,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "responded");
    assert_eq!(json["data"]["effective_status"], "responded");
    assert_eq!(json["data"]["is_responded"], true);
    assert!(!json["data"]["response_action_id"].is_null());

    // Responding again is rejected, not silently ignored.
    let response = post_json(
        &app,
        &format!("/api/v1/progress-requests/{request_id}/respond"),
        owner,
        serde_json::json!({ "progress_info": "again?" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    // So is cancelling a responded request.
    let response = post_empty(
        &app,
        &format!("/api/v1/progress-requests/{request_id}/cancel"),
        supervisor,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Test: out-of-range progress percentage is rejected up front
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn respond_rejects_out_of_range_percentage(pool: PgPool) {
    let supervisor = seed_user(&pool, "supervisor").await;
    let owner = seed_user(&pool, "owner").await;
    let ticket = seed_ticket(&pool, "TCK-503", owner).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/progress-requests",
        supervisor,
        serde_json::json!({ "ticket_id": ticket }),
    )
    .await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        &format!("/api/v1/progress-requests/{request_id}/respond"),
        owner,
        serde_json::json!({ "progress_info": "x", "progress_percentage": 150 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Test: incremental updates show up in the detail view while pending
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn updates_accumulate_in_detail_view(pool: PgPool) {
    let supervisor = seed_user(&pool, "supervisor").await;
    let owner = seed_user(&pool, "owner").await;
    let ticket = seed_ticket(&pool, "TCK-504", owner).await;
    let app = common::build_test_app(pool);

    let response = post_json(
        &app,
        "/api/v1/progress-requests",
        supervisor,
        serde_json::json!({ "ticket_id": ticket }),
    )
    .await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = post_json(
        &app,
        &format!("/api/v1/progress-requests/{request_id}/updates"),
        owner,
        serde_json::json!({ "progress_info": "Diagnosed", "progress_percentage": 20 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(
        &app,
        &format!("/api/v1/progress-requests/{request_id}"),
        supervisor,
    )
    .await;
    let json = body_json(response).await;
    let updates = json["data"]["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["progress_info"], "Diagnosed");
}

// ---------------------------------------------------------------------------
// Test: a pending request past its due date reads as overdue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_request_past_due_reads_overdue(pool: PgPool) {
    let supervisor = seed_user(&pool, "supervisor").await;
    let owner = seed_user(&pool, "owner").await;
    let ticket = seed_ticket(&pool, "TCK-505", owner).await;
    let app = common::build_test_app(pool.clone());

    let due = Utc::now() - Duration::hours(1);
    let response = post_json(
        &app,
        "/api/v1/progress-requests",
        supervisor,
        serde_json::json!({ "ticket_id": ticket, "due_date": iso(due) }),
    )
    .await;
    let json = body_json(response).await;
    let request_id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["effective_status"], "overdue");

    // The stored column still says pending -- overdue is never persisted.
    let stored: String =
        sqlx::query_scalar("SELECT status FROM progress_requests WHERE id = $1")
            .bind(request_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(stored, "pending");

    // And the assigned listing reports the computed view too.
    let response = get(&app, "/api/v1/progress-requests", owner).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["effective_status"], "overdue");
}
