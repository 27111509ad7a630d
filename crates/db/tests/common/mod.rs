//! Shared fixtures for repository integration tests.
//!
//! Users and tickets are owned by the upstream mutation workflow, so the
//! tests seed them with plain inserts rather than going through a
//! repository.

use faultline_core::types::DbId;
use sqlx::PgPool;

/// Insert a user and return its id.
pub async fn seed_user(pool: &PgPool, username: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .expect("seed user")
}

/// Insert a ticket owned by `owner` and return its id.
pub async fn seed_ticket(pool: &PgPool, code: &str, owner: DbId) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO tickets (code, title, owner_user_id) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(code)
    .bind(format!("Ticket {code}"))
    .bind(owner)
    .fetch_one(pool)
    .await
    .expect("seed ticket")
}
