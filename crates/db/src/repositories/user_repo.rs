//! Read-only repository for the externally-owned `users` table.

use faultline_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, role, is_active, created_at";

/// Provides lookups against users. All mutation happens upstream.
pub struct UserRepo;

impl UserRepo {
    /// Find an active user by its ID.
    ///
    /// Deactivated users read as absent: nothing in this service should
    /// target or attribute work to them.
    pub async fn find_active(pool: &PgPool, user_id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
