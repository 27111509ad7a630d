//! Notification entity models and DTOs.

use faultline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
///
/// Visible to a user iff `is_global`, or they are the target, or they
/// created it. Optionally resolved exactly once; never deleted (resolved
/// rows age out of default views after the retention window).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub notification_type: String,
    pub priority: String,
    pub ticket_id: DbId,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub created_by_user_id: DbId,
    pub is_global: bool,
    pub target_user_id: Option<DbId>,
    pub target_role: Option<String>,
    pub requires_action: bool,
    pub is_resolved: bool,
    pub resolved_at: Option<Timestamp>,
    pub resolved_by_user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

/// DTO for inserting a new notification.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub notification_type: String,
    pub priority: String,
    pub ticket_id: DbId,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub created_by_user_id: DbId,
    pub is_global: bool,
    pub target_user_id: Option<DbId>,
    pub target_role: Option<String>,
    pub requires_action: bool,
    pub expires_at: Option<Timestamp>,
}

/// A row from the `notification_reads` table. One per (notification,
/// user); marking read twice is a no-op, not an error.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationRead {
    pub id: DbId,
    pub notification_id: DbId,
    pub user_id: DbId,
    pub read_at: Timestamp,
    pub read_from: Option<String>,
}

/// A row from the `notification_actions` table. Append-only audit of
/// resolving actions, independent of read state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationAction {
    pub id: DbId,
    pub notification_id: DbId,
    pub user_id: DbId,
    pub action_type: String,
    pub notes: Option<String>,
    pub performed_at: Timestamp,
}

/// Per-user feed counters for the dashboard badge row.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationStats {
    pub total_unread: i64,
    pub new_tickets: i64,
    pub progress_requests: i64,
    pub requires_action: i64,
    pub high_priority: i64,
}

/// Filter parameters for notification feed queries.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationFilter {
    pub notification_type: Option<String>,
    pub unread_only: bool,
    pub limit: i64,
    pub offset: i64,
}
