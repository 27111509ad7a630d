//! Closed status and action-type vocabularies for tickets and progress
//! requests.
//!
//! These must match the values stored in the `ticket_actions.to_status`,
//! `tickets.status`, and `progress_requests.status` columns. The ticket
//! lifecycle itself (which transitions are legal) is enforced by the
//! ticket mutation workflow upstream; this crate only needs to *read*
//! recorded transitions, so no transition table lives here.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// TicketStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a ticket.
///
/// `Paused` is the only status the timeline reconstructor treats
/// specially (pause-interval extraction); every other value is opaque to
/// this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    Paused,
    Confirmed,
    Closed,
    Reopened,
    Cancelled,
}

impl TicketStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Paused => "paused",
            Self::Confirmed => "confirmed",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a stored status value. Returns `None` for unknown strings so
    /// log consumers can skip malformed rows instead of failing a whole
    /// reconstruction.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "paused" => Some(Self::Paused),
            "confirmed" => Some(Self::Confirmed),
            "closed" => Some(Self::Closed),
            "reopened" => Some(Self::Reopened),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActionType
// ---------------------------------------------------------------------------

/// Kind of a ticket action log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    StatusChange,
    Edit,
    Comment,
    Attachment,
}

impl ActionType {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::StatusChange => "status_change",
            Self::Edit => "edit",
            Self::Comment => "comment",
            Self::Attachment => "attachment",
        }
    }

    /// Parse a stored action type. Returns `None` for unknown strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "status_change" => Some(Self::StatusChange),
            "edit" => Some(Self::Edit),
            "comment" => Some(Self::Comment),
            "attachment" => Some(Self::Attachment),
            _ => None,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ProgressRequestStatus
// ---------------------------------------------------------------------------

/// Stored status of a progress request.
///
/// `Overdue` is never written to the database -- it is derived at read
/// time via [`effective_progress_status`] whenever a pending request has
/// sailed past its due date. The stored column only ever holds `pending`,
/// `responded`, or `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressRequestStatus {
    Pending,
    Responded,
    Overdue,
    Cancelled,
}

impl ProgressRequestStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Responded => "responded",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a stored status value. Returns `None` for unknown strings.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "responded" => Some(Self::Responded),
            "overdue" => Some(Self::Overdue),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the request can no longer be responded to or cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Responded | Self::Cancelled)
    }
}

impl std::fmt::Display for ProgressRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the status a progress request should *report* at `now`.
///
/// A pending request past its due date reads as [`Overdue`]; everything
/// else reads as stored. This never feeds back into the database.
///
/// [`Overdue`]: ProgressRequestStatus::Overdue
pub fn effective_progress_status(
    stored: ProgressRequestStatus,
    due_date: Option<Timestamp>,
    now: Timestamp,
) -> ProgressRequestStatus {
    match (stored, due_date) {
        (ProgressRequestStatus::Pending, Some(due)) if now > due => ProgressRequestStatus::Overdue,
        _ => stored,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
