//! Repository for the `notifications`, `notification_reads`, and
//! `notification_actions` tables.

use faultline_core::notifications::{KIND_NEW_TICKET, KIND_PROGRESS_REQUEST};
use faultline_core::notifications::{PRIORITY_HIGH, RESOLVED_RETENTION_DAYS};
use faultline_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{
    CreateNotification, Notification, NotificationAction, NotificationFilter, NotificationRead,
    NotificationStats,
};

/// Column list for `notifications` queries. Shared with the progress
/// request repository, which inserts the spawned notification inside its
/// own transaction.
pub(crate) const COLUMNS: &str = "\
    id, notification_type, priority, ticket_id, title, message, action_url, \
    created_by_user_id, is_global, target_user_id, target_role, requires_action, \
    is_resolved, resolved_at, resolved_by_user_id, created_at, expires_at";

/// Column list for `notification_actions` queries.
const ACTION_COLUMNS: &str = "id, notification_id, user_id, action_type, notes, performed_at";

/// Column list for `notification_reads` queries.
const READ_COLUMNS: &str = "id, notification_id, user_id, read_at, read_from";

/// Visibility predicate applied to every listing. `$1` is the caller.
///
/// A notification is visible iff it is global, targeted at the caller,
/// or created by the caller; resolved notifications stay visible for the
/// retention window and then age out (they are never deleted).
fn visibility_clause() -> String {
    format!(
        "(is_global = TRUE OR target_user_id = $1 OR created_by_user_id = $1) \
         AND (is_resolved = FALSE OR resolved_at > NOW() - INTERVAL '{RESOLVED_RETENTION_DAYS} days')"
    )
}

/// Unread predicate for the caller (`$1`), correlated on `notifications.id`.
const UNREAD_CLAUSE: &str = "NOT EXISTS (\
    SELECT 1 FROM notification_reads r \
    WHERE r.notification_id = notifications.id AND r.user_id = $1)";

/// Provides CRUD operations for notifications, read receipts, and
/// resolution actions.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification, returning the stored row.
    pub async fn create(
        pool: &PgPool,
        dto: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                (notification_type, priority, ticket_id, title, message, action_url, \
                 created_by_user_id, is_global, target_user_id, target_role, \
                 requires_action, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(&dto.notification_type)
            .bind(&dto.priority)
            .bind(dto.ticket_id)
            .bind(&dto.title)
            .bind(&dto.message)
            .bind(&dto.action_url)
            .bind(dto.created_by_user_id)
            .bind(dto.is_global)
            .bind(dto.target_user_id)
            .bind(&dto.target_role)
            .bind(dto.requires_action)
            .bind(dto.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a notification by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        notification_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notifications WHERE id = $1");
        sqlx::query_as::<_, Notification>(&query)
            .bind(notification_id)
            .fetch_optional(pool)
            .await
    }

    /// List the notifications visible to a user, newest first.
    pub async fn list_visible(
        pool: &PgPool,
        user_id: DbId,
        filter: &NotificationFilter,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let mut conditions = vec![visibility_clause()];
        let mut bind_idx = 2u32;

        if filter.notification_type.is_some() {
            conditions.push(format!("notification_type = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.unread_only {
            conditions.push(UNREAD_CLAUSE.to_string());
        }

        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE {} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Notification>(&query).bind(user_id);
        if let Some(ref notification_type) = filter.notification_type {
            q = q.bind(notification_type);
        }
        q.bind(filter.limit).bind(filter.offset).fetch_all(pool).await
    }

    /// Number of visible, unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM notifications WHERE {} AND {UNREAD_CLAUSE}",
            visibility_clause()
        );
        let count: Option<i64> = sqlx::query_scalar(&query).bind(user_id).fetch_one(pool).await?;
        Ok(count.unwrap_or(0))
    }

    /// Fetch the user's read receipt for a notification, if any.
    pub async fn find_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<Option<NotificationRead>, sqlx::Error> {
        let query = format!(
            "SELECT {READ_COLUMNS} FROM notification_reads \
             WHERE notification_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, NotificationRead>(&query)
            .bind(notification_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user already has a read receipt for the notification.
    pub async fn has_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(\
                SELECT 1 FROM notification_reads \
                WHERE notification_id = $1 AND user_id = $2)",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Mark a single notification as read for a user.
    ///
    /// Idempotent: returns `true` when a receipt was newly written and
    /// `false` when the user had already read it. The existence check
    /// runs first so a duplicate call is a clean no-op rather than a
    /// unique-constraint error.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
        read_from: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        if Self::has_read(pool, notification_id, user_id).await? {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO notification_reads (notification_id, user_id, read_from) \
             VALUES ($1, $2, $3)",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(read_from)
        .execute(pool)
        .await?;

        Ok(true)
    }

    /// Mark a batch of notifications as read for a user.
    ///
    /// One set-oriented insert: ids already read (and ids that do not
    /// exist) are filtered out before writing, so the batch as a whole is
    /// idempotent. Returns the number of receipts newly written.
    pub async fn mark_many_read(
        pool: &PgPool,
        notification_ids: &[DbId],
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notification_reads (notification_id, user_id) \
             SELECT n.id, $2 FROM notifications n \
             WHERE n.id = ANY($1) \
               AND NOT EXISTS (\
                   SELECT 1 FROM notification_reads r \
                   WHERE r.notification_id = n.id AND r.user_id = $2)",
        )
        .bind(notification_ids)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Resolve a notification, appending an action audit row.
    ///
    /// Returns `None` when the notification does not exist. Otherwise the
    /// action row is always appended -- multiple actors may legitimately
    /// act on the same alert -- but `is_resolved`/`resolved_at`/
    /// `resolved_by_user_id` are only stamped by the first resolution.
    /// The inner `Some(bool)` reports whether this call was that first
    /// resolution.
    pub async fn resolve(
        pool: &PgPool,
        notification_id: DbId,
        user_id: DbId,
        action_type: &str,
        notes: Option<&str>,
    ) -> Result<Option<bool>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let was_resolved: Option<bool> =
            sqlx::query_scalar("SELECT is_resolved FROM notifications WHERE id = $1 FOR UPDATE")
                .bind(notification_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(was_resolved) = was_resolved else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO notification_actions (notification_id, user_id, action_type, notes) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(action_type)
        .bind(notes)
        .execute(&mut *tx)
        .await?;

        if !was_resolved {
            sqlx::query(
                "UPDATE notifications \
                 SET is_resolved = TRUE, resolved_at = NOW(), resolved_by_user_id = $2 \
                 WHERE id = $1",
            )
            .bind(notification_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(!was_resolved))
    }

    /// List the resolution action audit trail for a notification.
    pub async fn list_actions(
        pool: &PgPool,
        notification_id: DbId,
    ) -> Result<Vec<NotificationAction>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTION_COLUMNS} FROM notification_actions \
             WHERE notification_id = $1 \
             ORDER BY performed_at ASC, id ASC"
        );
        sqlx::query_as::<_, NotificationAction>(&query)
            .bind(notification_id)
            .fetch_all(pool)
            .await
    }

    /// Per-user feed counters, computed in a single pass.
    pub async fn stats(pool: &PgPool, user_id: DbId) -> Result<NotificationStats, sqlx::Error> {
        let query = format!(
            "SELECT \
                COUNT(*) FILTER (WHERE r.id IS NULL), \
                COUNT(*) FILTER (WHERE r.id IS NULL AND n.notification_type = '{KIND_NEW_TICKET}'), \
                COUNT(*) FILTER (WHERE r.id IS NULL AND n.notification_type = '{KIND_PROGRESS_REQUEST}'), \
                COUNT(*) FILTER (WHERE n.requires_action = TRUE AND n.is_resolved = FALSE), \
                COUNT(*) FILTER (WHERE r.id IS NULL AND n.priority = '{PRIORITY_HIGH}') \
             FROM notifications n \
             LEFT JOIN notification_reads r \
                 ON r.notification_id = n.id AND r.user_id = $1 \
             WHERE (n.is_global = TRUE OR n.target_user_id = $1 OR n.created_by_user_id = $1) \
               AND (n.is_resolved = FALSE \
                    OR n.resolved_at > NOW() - INTERVAL '{RESOLVED_RETENTION_DAYS} days')"
        );

        let row: (Option<i64>, Option<i64>, Option<i64>, Option<i64>, Option<i64>) =
            sqlx::query_as(&query).bind(user_id).fetch_one(pool).await?;

        Ok(NotificationStats {
            total_unread: row.0.unwrap_or(0),
            new_tickets: row.1.unwrap_or(0),
            progress_requests: row.2.unwrap_or(0),
            requires_action: row.3.unwrap_or(0),
            high_priority: row.4.unwrap_or(0),
        })
    }
}
