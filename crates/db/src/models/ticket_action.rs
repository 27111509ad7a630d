//! Ticket action log entity models and DTOs.
//!
//! The action log is append-only: rows are created once per mutation and
//! never updated or deleted. The sequence for a ticket, ordered by
//! `performed_at`, is the sole source of truth for its status history.

use faultline_core::status::{ActionType, TicketStatus};
use faultline_core::timeline::TimelineEvent;
use faultline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `ticket_actions` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketAction {
    pub id: DbId,
    pub ticket_id: DbId,
    pub action_type: String,
    pub from_status: Option<String>,
    pub to_status: Option<String>,
    pub notes: Option<String>,
    pub performed_by_user_id: DbId,
    pub performed_at: Timestamp,
}

impl TicketAction {
    /// Project the row into the reconstructor's event shape.
    ///
    /// Returns `None` when the action type no longer parses; status
    /// strings that fail to parse are carried as `None` fields instead,
    /// which the reconstructor already filters on. One bad legacy row
    /// must not fail the whole timeline.
    pub fn timeline_event(&self) -> Option<TimelineEvent> {
        let action_type = ActionType::parse(&self.action_type)?;
        Some(TimelineEvent {
            action_type,
            from_status: self.from_status.as_deref().and_then(TicketStatus::parse),
            to_status: self.to_status.as_deref().and_then(TicketStatus::parse),
            performed_at: self.performed_at,
        })
    }
}

/// DTO for appending a new action log entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketAction {
    pub ticket_id: DbId,
    pub action_type: ActionType,
    pub from_status: Option<TicketStatus>,
    pub to_status: Option<TicketStatus>,
    pub notes: Option<String>,
    pub performed_by_user_id: DbId,
    /// `None` lets the database stamp `NOW()`.
    pub performed_at: Option<Timestamp>,
}
