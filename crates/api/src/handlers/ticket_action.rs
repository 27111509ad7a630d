//! Handlers for the ticket action log.
//!
//! The mutation workflow upstream validates transitions; this service
//! records them, keeps derived caches honest, and raises the follow-on
//! notifications. The log itself is append-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use faultline_core::error::CoreError;
use faultline_core::notifications::{KIND_NEW_TICKET, PRIORITY_NORMAL};
use faultline_core::status::{ActionType, TicketStatus};
use faultline_core::types::{DbId, Timestamp};
use faultline_db::models::notification::CreateNotification;
use faultline_db::models::ticket::Ticket;
use faultline_db::models::ticket_action::{CreateTicketAction, TicketAction};
use faultline_db::repositories::{NotificationRepo, TicketActionRepo, TicketRepo};
use faultline_events::DomainEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifications::publish_notification;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /tickets/{id}/actions`.
#[derive(Debug, Deserialize)]
pub struct RecordActionRequest {
    pub action_type: ActionType,
    pub from_status: Option<TicketStatus>,
    pub to_status: Option<TicketStatus>,
    pub notes: Option<String>,
    /// Omitted: the database stamps the current time.
    pub performed_at: Option<Timestamp>,
}

/// POST /api/v1/tickets/{id}/actions
///
/// Append one action to a ticket's log. Status changes and pauses
/// invalidate the derived-view caches; a `create` action additionally
/// raises the global new-ticket notification.
pub async fn record_action(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Json(input): Json<RecordActionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketAction>>)> {
    let ticket = TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        }))?;

    // Log invariant: a status change always carries its destination.
    if input.action_type == ActionType::StatusChange && input.to_status.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "to_status is required for status_change actions".to_string(),
        )));
    }

    let dto = CreateTicketAction {
        ticket_id,
        action_type: input.action_type,
        from_status: input.from_status,
        to_status: input.to_status,
        notes: input.notes,
        performed_by_user_id: auth.user_id,
        performed_at: input.performed_at,
    };
    let action = TicketActionRepo::append(&state.pool, &dto).await?;

    // Derived views for this ticket are stale now; pause views only when
    // the change crossed the paused boundary.
    state.cache.invalidate_ticket(ticket_id).await;
    let touches_pause = input.from_status == Some(TicketStatus::Paused)
        || input.to_status == Some(TicketStatus::Paused);
    if touches_pause {
        state.cache.invalidate_pauses(ticket_id).await;
    }

    state.event_bus.publish(
        DomainEvent::new("ticket.action.recorded")
            .with_ticket(ticket_id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({
                "action_id": action.id,
                "action_type": action.action_type,
                "to_status": action.to_status,
            })),
    );

    if input.action_type == ActionType::Create {
        notify_new_ticket(&state, &ticket, auth.user_id).await?;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: action })))
}

/// GET /api/v1/tickets/{id}/actions
///
/// The raw action log for a ticket, in chronological order.
pub async fn list_actions(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TicketAction>>>> {
    if TicketRepo::find_by_id(&state.pool, ticket_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        }));
    }

    let actions = TicketActionRepo::list_for_ticket(&state.pool, ticket_id).await?;
    Ok(Json(DataResponse { data: actions }))
}

/// Raise the global new-ticket notification and hand it to the pusher.
async fn notify_new_ticket(
    state: &AppState,
    ticket: &Ticket,
    created_by: DbId,
) -> AppResult<()> {
    let dto = CreateNotification {
        notification_type: KIND_NEW_TICKET.to_string(),
        priority: PRIORITY_NORMAL.to_string(),
        ticket_id: ticket.id,
        title: format!("New ticket {}", ticket.code),
        message: ticket.title.clone(),
        action_url: Some(format!("/tickets/{}", ticket.id)),
        created_by_user_id: created_by,
        is_global: true,
        target_user_id: None,
        target_role: None,
        requires_action: false,
        expires_at: None,
    };
    let notification = NotificationRepo::create(&state.pool, &dto).await?;

    publish_notification(&state.event_bus, &notification, &ticket.code);
    Ok(())
}
