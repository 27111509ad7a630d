//! Repository for the append-only `ticket_actions` table.

use faultline_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket_action::{CreateTicketAction, TicketAction};

/// Column list for `ticket_actions` queries.
const COLUMNS: &str = "\
    id, ticket_id, action_type, from_status, to_status, \
    notes, performed_by_user_id, performed_at";

/// Provides append and read access to the ticket action log.
///
/// There is deliberately no update or delete here: the log is the sole
/// source of truth for status history and rows are immutable.
pub struct TicketActionRepo;

impl TicketActionRepo {
    /// Append an action to the log, returning the stored row.
    pub async fn append(
        pool: &PgPool,
        dto: &CreateTicketAction,
    ) -> Result<TicketAction, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_actions \
                (ticket_id, action_type, from_status, to_status, notes, \
                 performed_by_user_id, performed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TicketAction>(&query)
            .bind(dto.ticket_id)
            .bind(dto.action_type.as_str())
            .bind(dto.from_status.map(|s| s.as_str()))
            .bind(dto.to_status.map(|s| s.as_str()))
            .bind(&dto.notes)
            .bind(dto.performed_by_user_id)
            .bind(dto.performed_at)
            .fetch_one(pool)
            .await
    }

    /// The full action sequence for one ticket, in log order.
    ///
    /// Ordered by `performed_at` with ties broken by insertion order so
    /// the reconstructor sees a deterministic sequence.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<TicketAction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_actions \
             WHERE ticket_id = $1 \
             ORDER BY performed_at ASC, id ASC"
        );
        sqlx::query_as::<_, TicketAction>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }
}
