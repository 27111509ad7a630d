//! Progress request entity models and DTOs.

use faultline_core::status::{effective_progress_status, ProgressRequestStatus};
use faultline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `progress_requests` table.
///
/// Linked one-to-one with the notification it spawned
/// (`notification_id`, back-filled after the notification insert) and
/// one-to-many with [`ProgressRequestUpdate`] rows.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressRequest {
    pub id: DbId,
    pub ticket_id: DbId,
    pub requested_by_user_id: DbId,
    pub target_user_id: DbId,
    pub request_message: Option<String>,
    pub requested_at: Timestamp,
    pub due_date: Option<Timestamp>,
    pub progress_info: Option<String>,
    pub progress_percentage: Option<i32>,
    pub estimated_completion: Option<Timestamp>,
    pub is_responded: bool,
    pub responded_at: Option<Timestamp>,
    pub responded_by_user_id: Option<DbId>,
    pub response_action_id: Option<DbId>,
    /// Stored status: `pending`, `responded`, or `cancelled`. Overdue is
    /// never stored; use [`ProgressRequest::effective_status`].
    pub status: String,
    pub notification_id: Option<DbId>,
}

impl ProgressRequest {
    /// Stored status parsed into the closed enum. Falls back to
    /// `Pending` if the column ever holds an unknown value.
    pub fn stored_status(&self) -> ProgressRequestStatus {
        ProgressRequestStatus::parse(&self.status).unwrap_or(ProgressRequestStatus::Pending)
    }

    /// The status this request should report at `now`: a pending request
    /// past its due date reads as overdue.
    pub fn effective_status(&self, now: Timestamp) -> ProgressRequestStatus {
        effective_progress_status(self.stored_status(), self.due_date, now)
    }
}

/// DTO for creating a progress request.
#[derive(Debug, Clone)]
pub struct CreateProgressRequest {
    pub ticket_id: DbId,
    pub requested_by_user_id: DbId,
    pub target_user_id: DbId,
    pub request_message: Option<String>,
    pub due_date: Timestamp,
}

/// DTO for the final response to a progress request.
#[derive(Debug, Clone, Deserialize)]
pub struct RespondProgressRequest {
    pub progress_info: String,
    pub progress_percentage: Option<i32>,
    pub estimated_completion: Option<Timestamp>,
}

/// A row from the `progress_request_updates` table: an incremental
/// report filed while the request is still pending.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgressRequestUpdate {
    pub id: DbId,
    pub progress_request_id: DbId,
    pub user_id: DbId,
    pub progress_info: String,
    pub progress_percentage: Option<i32>,
    pub estimated_completion: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for appending an incremental progress update.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgressRequestUpdate {
    pub progress_info: String,
    pub progress_percentage: Option<i32>,
    pub estimated_completion: Option<Timestamp>,
}
