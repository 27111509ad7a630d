//! Route definitions for the `/progress-requests` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::progress_request;
use crate::state::AppState;

/// Routes mounted at `/progress-requests`.
///
/// ```text
/// GET    /                 -> list_assigned
/// POST   /                 -> create
/// GET    /{id}             -> get
/// POST   /{id}/respond     -> respond
/// POST   /{id}/cancel      -> cancel
/// POST   /{id}/updates     -> add_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(progress_request::list_assigned).post(progress_request::create),
        )
        .route("/{id}", get(progress_request::get))
        .route("/{id}/respond", post(progress_request::respond))
        .route("/{id}/cancel", post(progress_request::cancel))
        .route("/{id}/updates", post(progress_request::add_update))
}
