pub mod health;
pub mod notification;
pub mod progress_request;
pub mod ticket;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (token via ?token=)
///
/// /tickets/{id}/actions                action log: list (GET), record (POST)
/// /tickets/{id}/timeline               derived status segments (GET)
/// /tickets/{id}/pauses                 derived pause intervals (GET)
/// /tickets/{id}/progress-requests      requests for one ticket (GET)
///
/// /notifications                       visible feed (GET)
/// /notifications/unread-count          unread badge count (GET)
/// /notifications/stats                 dashboard counters (GET)
/// /notifications/read-multiple         batch read receipts (POST)
/// /notifications/{id}/read             single read receipt (POST)
/// /notifications/{id}/resolve          resolve + action audit (POST)
///
/// /progress-requests                   assigned list (GET), create (POST)
/// /progress-requests/{id}              detail with updates (GET)
/// /progress-requests/{id}/respond      final response (POST)
/// /progress-requests/{id}/cancel       cancellation (POST)
/// /progress-requests/{id}/updates      incremental report (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/tickets", ticket::router())
        .nest("/notifications", notification::router())
        .nest("/progress-requests", progress_request::router())
}
