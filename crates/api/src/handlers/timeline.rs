//! Handlers for the derived timeline views.
//!
//! Nothing here is stored: both views are reconstructed from the action
//! log on every cache miss. The cache coordinator owns staleness; the
//! reconstruction itself stays pure.

use axum::extract::{Path, Query, State};
use axum::Json;
use faultline_core::error::CoreError;
use faultline_core::timeline::{self, PauseInterval, StatusSegment};
use faultline_core::types::{DbId, Timestamp};
use faultline_db::models::ticket::Ticket;
use faultline_db::repositories::{TicketActionRepo, TicketRepo};
use serde::{Deserialize, Serialize};

use crate::cache::keys;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /tickets/{id}/timeline`.
#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    /// Override for the trailing segment's end. Defaults to the ticket's
    /// resolution chain (response resolution, resolution date, last
    /// update).
    pub end_at: Option<Timestamp>,
}

/// Derived status timeline for one ticket.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineView {
    pub ticket_id: DbId,
    pub effective_end: Timestamp,
    pub segments: Vec<StatusSegment>,
    /// Narrative form, e.g. `"OPEN 1h -> PAUSED 30m -> OPEN 2h30m"`.
    pub rendered: String,
}

/// Derived pause intervals for one ticket.
#[derive(Debug, Serialize, Deserialize)]
pub struct PauseView {
    pub ticket_id: DbId,
    pub intervals: Vec<PauseInterval>,
}

/// GET /api/v1/tickets/{id}/timeline
///
/// Status-duration segments reconstructed from the action log. Cached
/// under the ticket detail key unless the caller overrides `end_at`
/// (custom ends must not poison the shared entry).
pub async fn get_timeline(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Query(params): Query<TimelineQuery>,
) -> AppResult<Json<DataResponse<TimelineView>>> {
    let ticket = find_ticket(&state, ticket_id).await?;

    let view = match params.end_at {
        Some(end_at) => build_timeline(&state, &ticket, end_at).await?,
        None => {
            let key = keys::ticket_detail(ticket_id);
            state
                .cache
                .get_or_set(&key, None, || {
                    build_timeline(&state, &ticket, ticket.effective_end())
                })
                .await?
        }
    };

    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/tickets/{id}/pauses
///
/// Pause intervals reconstructed from the action log, cached per ticket.
/// Reported as structured columns (start/end) rather than narrative text
/// because exported reports consume them as-is.
pub async fn get_pauses(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<Json<DataResponse<PauseView>>> {
    find_ticket(&state, ticket_id).await?;

    let key = keys::pause_ticket(ticket_id);
    let view = state
        .cache
        .get_or_set(&key, None, || build_pauses(&state, ticket_id))
        .await?;

    Ok(Json(DataResponse { data: view }))
}

async fn find_ticket(state: &AppState, ticket_id: DbId) -> AppResult<Ticket> {
    TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        }))
}

/// Reconstruct the segment view from the stored log.
async fn build_timeline(
    state: &AppState,
    ticket: &Ticket,
    effective_end: Timestamp,
) -> AppResult<TimelineView> {
    let log = TicketActionRepo::list_for_ticket(&state.pool, ticket.id).await?;
    let events: Vec<_> = log.iter().filter_map(|a| a.timeline_event()).collect();

    let segments = timeline::status_segments(&events, effective_end);
    let rendered = timeline::render_segments(&segments);

    Ok(TimelineView {
        ticket_id: ticket.id,
        effective_end,
        segments,
        rendered,
    })
}

/// Reconstruct the pause view from the stored log.
async fn build_pauses(state: &AppState, ticket_id: DbId) -> AppResult<PauseView> {
    let log = TicketActionRepo::list_for_ticket(&state.pool, ticket_id).await?;
    let events: Vec<_> = log.iter().filter_map(|a| a.timeline_event()).collect();

    Ok(PauseView {
        ticket_id,
        intervals: timeline::pause_intervals(&events),
    })
}
