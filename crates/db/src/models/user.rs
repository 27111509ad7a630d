//! User entity model (externally owned, read-only here).

use faultline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}
