//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                 -> list_notifications
/// GET    /unread-count     -> unread_count
/// GET    /stats            -> stats
/// POST   /read-multiple    -> mark_multiple_read
/// POST   /{id}/read        -> mark_read
/// POST   /{id}/resolve     -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list_notifications))
        .route("/unread-count", get(notification::unread_count))
        .route("/stats", get(notification::stats))
        .route("/read-multiple", post(notification::mark_multiple_read))
        .route("/{id}/read", post(notification::mark_read))
        .route("/{id}/resolve", post(notification::resolve))
}
