//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`]; every listing
//! applies the visibility rule (global, targeted at the caller, or
//! created by the caller) in the repository layer.

use axum::extract::{Path, Query, State};
use axum::Json;
use faultline_core::error::CoreError;
use faultline_core::notifications::ACTION_RESOLVE;
use faultline_core::types::DbId;
use faultline_db::models::notification::{Notification, NotificationFilter, NotificationStats};
use faultline_db::repositories::NotificationRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /notifications`.
///
/// `limit`/`offset` are spelled out rather than flattening
/// [`PaginationParams`]: serde_urlencoded cannot flatten non-string
/// fields out of query strings.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// Restrict the feed to one notification type.
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    /// If `true`, return only unread notifications. Defaults to `false`.
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for `POST /notifications/{id}/read`.
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    /// Where the read happened (e.g. `"feed"`, `"toast"`).
    pub read_from: Option<String>,
}

/// Request body for `POST /notifications/read-multiple`.
#[derive(Debug, Deserialize)]
pub struct MarkMultipleRequest {
    pub ids: Vec<DbId>,
}

/// Request body for `POST /notifications/{id}/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    /// Defaults to `"resolve"`.
    pub action_type: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
///
/// List the caller's visible notifications with optional filtering.
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<DataResponse<Vec<Notification>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .clamp();
    let filter = NotificationFilter {
        notification_type: params.notification_type,
        unread_only: params.unread_only,
        limit,
        offset,
    };

    let notifications = NotificationRepo::list_visible(&state.pool, auth.user_id, &filter).await?;
    Ok(Json(DataResponse { data: notifications }))
}

/// GET /api/v1/notifications/unread-count
///
/// Return the number of visible, unread notifications for the caller.
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "count": count }
    })))
}

/// GET /api/v1/notifications/stats
///
/// Per-user feed counters for the dashboard badge row.
pub async fn stats(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<NotificationStats>>> {
    let stats = NotificationRepo::stats(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

// ---------------------------------------------------------------------------
// Read receipts
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/{id}/read
///
/// Mark a single notification as read. Idempotent: `newly_read` is
/// `false` when the caller had already read it.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
    Json(input): Json<MarkReadRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if NotificationRepo::find_by_id(&state.pool, notification_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }));
    }

    let newly_read = NotificationRepo::mark_read(
        &state.pool,
        notification_id,
        auth.user_id,
        input.read_from.as_deref(),
    )
    .await?;

    Ok(Json(serde_json::json!({
        "data": { "newly_read": newly_read }
    })))
}

/// POST /api/v1/notifications/read-multiple
///
/// Mark a batch of notifications as read in one set-oriented statement.
/// Duplicate and already-read ids are skipped, so the batch as a whole
/// is idempotent. Returns the number newly marked.
pub async fn mark_multiple_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<MarkMultipleRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let marked = NotificationRepo::mark_many_read(&state.pool, &input.ids, auth.user_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "marked_read": marked }
    })))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// POST /api/v1/notifications/{id}/resolve
///
/// Resolve a notification. Every call appends an action audit row;
/// only the first stamps `resolved_at`/`resolved_by_user_id`.
/// `newly_resolved` reports whether this call was that first one.
pub async fn resolve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
    Json(input): Json<ResolveRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let action_type = input.action_type.as_deref().unwrap_or(ACTION_RESOLVE);

    let newly_resolved = NotificationRepo::resolve(
        &state.pool,
        notification_id,
        auth.user_id,
        action_type,
        input.notes.as_deref(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Notification",
        id: notification_id,
    }))?;

    Ok(Json(serde_json::json!({
        "data": { "newly_resolved": newly_resolved }
    })))
}
