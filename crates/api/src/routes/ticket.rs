//! Route definitions for the `/tickets` resource.
//!
//! All endpoints require authentication. Ticket CRUD itself lives in the
//! upstream mutation workflow; these routes cover the action log and the
//! derived views over it.

use axum::routing::get;
use axum::Router;

use crate::handlers::{progress_request, ticket_action, timeline};
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// GET    /{id}/actions            -> list_actions
/// POST   /{id}/actions            -> record_action
/// GET    /{id}/timeline           -> get_timeline
/// GET    /{id}/pauses             -> get_pauses
/// GET    /{id}/progress-requests  -> list_for_ticket
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/actions",
            get(ticket_action::list_actions).post(ticket_action::record_action),
        )
        .route("/{id}/timeline", get(timeline::get_timeline))
        .route("/{id}/pauses", get(timeline::get_pauses))
        .route(
            "/{id}/progress-requests",
            get(progress_request::list_for_ticket),
        )
}
