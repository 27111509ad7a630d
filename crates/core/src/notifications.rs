//! Well-known notification kind, priority, and action-type constants.
//!
//! These must match the values stored in the `notifications` and
//! `notification_actions` tables and referenced by the API handlers, the
//! WebSocket pusher, and the stats query.

/// Broadcast to everyone when a new ticket is filed.
pub const KIND_NEW_TICKET: &str = "new_ticket";

/// Targeted at a single user who is asked to report progress on a ticket.
pub const KIND_PROGRESS_REQUEST: &str = "progress_request";

/// Informational status-change notice (ticket closed, reopened, ...).
pub const KIND_STATUS_CHANGE: &str = "status_change";

// ---------------------------------------------------------------------------
// Priorities
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_NORMAL: &str = "normal";
pub const PRIORITY_HIGH: &str = "high";

// ---------------------------------------------------------------------------
// Notification action types
// ---------------------------------------------------------------------------

/// A user explicitly resolved the notification from the feed.
pub const ACTION_RESOLVE: &str = "resolve";

/// A progress request was answered; the action row doubles as the
/// response audit record linked from `progress_requests.response_action_id`.
pub const ACTION_PROGRESS_RESPONSE: &str = "progress_response";

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Resolved notifications stay visible in default views for this many
/// days, then age out. They are never deleted.
pub const RESOLVED_RETENTION_DAYS: i64 = 7;

/// Default due-date / expiry window for a progress request when the
/// caller does not supply one.
pub const PROGRESS_REQUEST_DUE_DAYS: i64 = 7;
