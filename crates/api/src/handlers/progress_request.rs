//! Handlers for the `/progress-requests` resource.
//!
//! A progress request asks one user to report status on a ticket by a
//! due date. Creation is a two-record transaction (request + targeted
//! notification); responding and cancelling are terminal transitions
//! guarded against racing callers in the repository.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use faultline_core::error::CoreError;
use faultline_core::notifications::{
    KIND_PROGRESS_REQUEST, PRIORITY_HIGH, PROGRESS_REQUEST_DUE_DAYS,
};
use faultline_core::status::ProgressRequestStatus;
use faultline_core::types::{DbId, Timestamp};
use faultline_db::models::notification::CreateNotification;
use faultline_db::models::progress_request::{
    CreateProgressRequest, CreateProgressRequestUpdate, ProgressRequest, ProgressRequestUpdate,
    RespondProgressRequest,
};
use faultline_db::repositories::{ProgressRequestRepo, TicketRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::publish_notification;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /progress-requests`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub ticket_id: DbId,
    /// Defaults to the ticket owner.
    pub target_user_id: Option<DbId>,
    pub message: Option<String>,
    /// Defaults to seven days from now.
    pub due_date: Option<Timestamp>,
}

/// A progress request as reported to clients: the stored row plus the
/// read-time effective status (`overdue` is never persisted).
#[derive(Debug, Serialize)]
pub struct ProgressRequestView {
    #[serde(flatten)]
    pub request: ProgressRequest,
    pub effective_status: ProgressRequestStatus,
}

impl ProgressRequestView {
    fn now(request: ProgressRequest) -> Self {
        let effective_status = request.effective_status(Utc::now());
        Self {
            request,
            effective_status,
        }
    }
}

/// Response body for `GET /progress-requests/{id}`: the view plus the
/// incremental updates filed so far.
#[derive(Debug, Serialize)]
pub struct ProgressRequestDetail {
    #[serde(flatten)]
    pub view: ProgressRequestView,
    pub updates: Vec<ProgressRequestUpdate>,
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// POST /api/v1/progress-requests
///
/// Create a progress request and its targeted notification in one
/// transaction. Fails fast with NotFound -- before any write -- when the
/// ticket or the target user does not exist.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ProgressRequestView>>)> {
    let ticket = TicketRepo::find_by_id(&state.pool, input.ticket_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: input.ticket_id,
        }))?;

    let target_user_id = input.target_user_id.unwrap_or(ticket.owner_user_id);
    let target = UserRepo::find_active(&state.pool, target_user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: target_user_id,
        }))?;

    let due_date = input
        .due_date
        .unwrap_or_else(|| Utc::now() + Duration::days(PROGRESS_REQUEST_DUE_DAYS));

    let request_dto = CreateProgressRequest {
        ticket_id: ticket.id,
        requested_by_user_id: auth.user_id,
        target_user_id: target.id,
        request_message: input.message.clone(),
        due_date,
    };
    let notification_dto = CreateNotification {
        notification_type: KIND_PROGRESS_REQUEST.to_string(),
        priority: PRIORITY_HIGH.to_string(),
        ticket_id: ticket.id,
        title: format!("Progress requested on {}", ticket.code),
        message: input
            .message
            .unwrap_or_else(|| format!("Please report progress on {}", ticket.code)),
        action_url: Some(format!("/tickets/{}", ticket.id)),
        created_by_user_id: auth.user_id,
        is_global: false,
        target_user_id: Some(target.id),
        target_role: None,
        requires_action: true,
        expires_at: Some(due_date),
    };

    let (request, notification) =
        ProgressRequestRepo::create_with_notification(&state.pool, &request_dto, &notification_dto)
            .await?;

    publish_notification(&state.event_bus, &notification, &ticket.code);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ProgressRequestView::now(request),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/progress-requests/{id}
///
/// One request with its incremental updates.
pub async fn get(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProgressRequestDetail>>> {
    let request = find_request(&state, request_id).await?;
    let updates = ProgressRequestRepo::list_updates(&state.pool, request_id).await?;

    Ok(Json(DataResponse {
        data: ProgressRequestDetail {
            view: ProgressRequestView::now(request),
            updates,
        },
    }))
}

/// GET /api/v1/progress-requests
///
/// The caller's assigned requests, newest first.
pub async fn list_assigned(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ProgressRequestView>>>> {
    let (limit, offset) = page.clamp();
    let requests =
        ProgressRequestRepo::list_for_target(&state.pool, auth.user_id, limit, offset).await?;

    let views = requests.into_iter().map(ProgressRequestView::now).collect();
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/tickets/{id}/progress-requests
///
/// All requests filed against one ticket, newest first.
pub async fn list_for_ticket(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProgressRequestView>>>> {
    if TicketRepo::find_by_id(&state.pool, ticket_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        }));
    }

    let requests = ProgressRequestRepo::list_for_ticket(&state.pool, ticket_id).await?;
    let views = requests.into_iter().map(ProgressRequestView::now).collect();
    Ok(Json(DataResponse { data: views }))
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/progress-requests/{id}/respond
///
/// File the final response. Rejected with InvalidState for terminal
/// requests -- never silently ignored.
pub async fn respond(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<RespondProgressRequest>,
) -> AppResult<Json<DataResponse<ProgressRequestView>>> {
    ensure_percentage(input.progress_percentage)?;

    let existing = find_request(&state, request_id).await?;
    ensure_pending(&existing)?;

    let responded = ProgressRequestRepo::respond(&state.pool, request_id, auth.user_id, &input)
        .await?
        // The guard lost a race: someone else just made it terminal.
        .ok_or_else(|| invalid_transition(&existing))?;

    Ok(Json(DataResponse {
        data: ProgressRequestView::now(responded),
    }))
}

/// POST /api/v1/progress-requests/{id}/cancel
///
/// Cancel a pending request. Terminal.
pub async fn cancel(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProgressRequestView>>> {
    let existing = find_request(&state, request_id).await?;
    ensure_pending(&existing)?;

    let cancelled = ProgressRequestRepo::cancel(&state.pool, request_id, auth.user_id)
        .await?
        .ok_or_else(|| invalid_transition(&existing))?;

    Ok(Json(DataResponse {
        data: ProgressRequestView::now(cancelled),
    }))
}

/// POST /api/v1/progress-requests/{id}/updates
///
/// File an incremental progress report while the request is pending.
pub async fn add_update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<CreateProgressRequestUpdate>,
) -> AppResult<(StatusCode, Json<DataResponse<ProgressRequestUpdate>>)> {
    ensure_percentage(input.progress_percentage)?;

    let existing = find_request(&state, request_id).await?;
    ensure_pending(&existing)?;

    let update =
        ProgressRequestRepo::add_update(&state.pool, request_id, auth.user_id, &input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: update })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_request(state: &AppState, request_id: DbId) -> AppResult<ProgressRequest> {
    ProgressRequestRepo::find_by_id(&state.pool, request_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProgressRequest",
            id: request_id,
        }))
}

fn ensure_percentage(percentage: Option<i32>) -> AppResult<()> {
    match percentage {
        Some(pct) if !(0..=100).contains(&pct) => Err(AppError::Core(CoreError::Validation(
            "progress_percentage must be between 0 and 100".to_string(),
        ))),
        _ => Ok(()),
    }
}

fn ensure_pending(request: &ProgressRequest) -> AppResult<()> {
    if request.stored_status().is_terminal() {
        return Err(invalid_transition(request));
    }
    Ok(())
}

fn invalid_transition(request: &ProgressRequest) -> AppError {
    AppError::Core(CoreError::InvalidState(format!(
        "Progress request {} is no longer pending (status: {})",
        request.id, request.status
    )))
}
