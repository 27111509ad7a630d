//! Read-only repository for the externally-owned `tickets` table.

use faultline_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::Ticket;

/// Column list for `tickets` queries.
const COLUMNS: &str = "\
    id, code, title, status, owner_user_id, \
    response_resolved_at, resolution_date, created_at, updated_at";

/// Provides lookups against tickets. All mutation happens upstream.
pub struct TicketRepo;

impl TicketRepo {
    /// Find a ticket by its ID.
    pub async fn find_by_id(pool: &PgPool, ticket_id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .fetch_optional(pool)
            .await
    }
}
