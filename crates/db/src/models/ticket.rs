//! Ticket entity model.
//!
//! Tickets are owned by the upstream mutation workflow; this service only
//! reads them for existence/ownership checks, push payload enrichment
//! (`code`), and the effective-end fallback chain of the timeline.

use faultline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub code: String,
    pub title: String,
    pub status: String,
    pub owner_user_id: DbId,
    pub response_resolved_at: Option<Timestamp>,
    pub resolution_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ticket {
    /// Fallback end instant for the trailing timeline segment:
    /// response resolution, then resolution date, then last update.
    pub fn effective_end(&self) -> Timestamp {
        self.response_resolved_at
            .or(self.resolution_date)
            .unwrap_or(self.updated_at)
    }
}
