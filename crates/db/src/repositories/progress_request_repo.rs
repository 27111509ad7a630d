//! Repository for the `progress_requests` and `progress_request_updates`
//! tables.
//!
//! Creation and the terminal transitions are multi-row writes, so they
//! run inside a repository-owned transaction: either every row lands or
//! none do.

use faultline_core::notifications::ACTION_PROGRESS_RESPONSE;
use faultline_core::status::ProgressRequestStatus;
use faultline_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::notification::{CreateNotification, Notification};
use crate::models::progress_request::{
    CreateProgressRequest, CreateProgressRequestUpdate, ProgressRequest, ProgressRequestUpdate,
    RespondProgressRequest,
};
use crate::repositories::notification_repo;

/// Column list for `progress_requests` queries.
const COLUMNS: &str = "\
    id, ticket_id, requested_by_user_id, target_user_id, request_message, \
    requested_at, due_date, progress_info, progress_percentage, \
    estimated_completion, is_responded, responded_at, responded_by_user_id, \
    response_action_id, status, notification_id";

/// Column list for `progress_request_updates` queries.
const UPDATE_COLUMNS: &str = "\
    id, progress_request_id, user_id, progress_info, progress_percentage, \
    estimated_completion, created_at";

/// Provides CRUD operations for progress requests.
pub struct ProgressRequestRepo;

impl ProgressRequestRepo {
    /// Create a progress request together with the notification it spawns.
    ///
    /// One transaction: insert the request, insert the targeted
    /// notification, back-fill `notification_id` onto the request. The
    /// caller has already verified that the ticket and target user exist,
    /// so a failure here is a store failure and nothing partial survives.
    pub async fn create_with_notification(
        pool: &PgPool,
        request: &CreateProgressRequest,
        notification: &CreateNotification,
    ) -> Result<(ProgressRequest, Notification), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_request = format!(
            "INSERT INTO progress_requests \
                (ticket_id, requested_by_user_id, target_user_id, request_message, due_date) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let created: ProgressRequest = sqlx::query_as(&insert_request)
            .bind(request.ticket_id)
            .bind(request.requested_by_user_id)
            .bind(request.target_user_id)
            .bind(&request.request_message)
            .bind(request.due_date)
            .fetch_one(&mut *tx)
            .await?;

        let insert_notification = format!(
            "INSERT INTO notifications \
                (notification_type, priority, ticket_id, title, message, action_url, \
                 created_by_user_id, is_global, target_user_id, target_role, \
                 requires_action, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {}",
            notification_repo::COLUMNS
        );
        let spawned: Notification = sqlx::query_as(&insert_notification)
            .bind(&notification.notification_type)
            .bind(&notification.priority)
            .bind(notification.ticket_id)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(&notification.action_url)
            .bind(notification.created_by_user_id)
            .bind(notification.is_global)
            .bind(notification.target_user_id)
            .bind(&notification.target_role)
            .bind(notification.requires_action)
            .bind(notification.expires_at)
            .fetch_one(&mut *tx)
            .await?;

        let backfill = format!(
            "UPDATE progress_requests SET notification_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let created: ProgressRequest = sqlx::query_as(&backfill)
            .bind(created.id)
            .bind(spawned.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((created, spawned))
    }

    /// Find a progress request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<ProgressRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM progress_requests WHERE id = $1");
        sqlx::query_as::<_, ProgressRequest>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// List progress requests for a ticket, newest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<ProgressRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_requests \
             WHERE ticket_id = $1 \
             ORDER BY requested_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProgressRequest>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// List progress requests assigned to a user, newest first.
    pub async fn list_for_target(
        pool: &PgPool,
        target_user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProgressRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM progress_requests \
             WHERE target_user_id = $1 \
             ORDER BY requested_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ProgressRequest>(&query)
            .bind(target_user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Record the final response to a pending request.
    ///
    /// The guarded `WHERE status = 'pending'` makes racing responders
    /// lose cleanly: `None` means the request was missing or already
    /// terminal (the handler distinguishes the two). On success the
    /// response audit row is appended to `notification_actions`, linked
    /// via `response_action_id`, and the spawned notification is resolved
    /// first-resolution-wins -- all in one transaction.
    pub async fn respond(
        pool: &PgPool,
        request_id: DbId,
        user_id: DbId,
        dto: &RespondProgressRequest,
    ) -> Result<Option<ProgressRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE progress_requests \
             SET is_responded = TRUE, responded_at = NOW(), responded_by_user_id = $2, \
                 progress_info = $3, progress_percentage = $4, estimated_completion = $5, \
                 status = '{}' \
             WHERE id = $1 AND status = '{}' \
             RETURNING {COLUMNS}",
            ProgressRequestStatus::Responded,
            ProgressRequestStatus::Pending,
        );
        let updated: Option<ProgressRequest> = sqlx::query_as(&update)
            .bind(request_id)
            .bind(user_id)
            .bind(&dto.progress_info)
            .bind(dto.progress_percentage)
            .bind(dto.estimated_completion)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(mut responded) = updated else {
            return Ok(None);
        };

        if let Some(notification_id) = responded.notification_id {
            let action_id: DbId = sqlx::query_scalar(
                "INSERT INTO notification_actions (notification_id, user_id, action_type, notes) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id",
            )
            .bind(notification_id)
            .bind(user_id)
            .bind(ACTION_PROGRESS_RESPONSE)
            .bind(&dto.progress_info)
            .fetch_one(&mut *tx)
            .await?;

            let link = format!(
                "UPDATE progress_requests SET response_action_id = $2 \
                 WHERE id = $1 RETURNING {COLUMNS}"
            );
            responded = sqlx::query_as(&link)
                .bind(request_id)
                .bind(action_id)
                .fetch_one(&mut *tx)
                .await?;

            Self::resolve_notification(&mut tx, notification_id, user_id).await?;
        }

        tx.commit().await?;
        Ok(Some(responded))
    }

    /// Cancel a pending request. Terminal; same guard as [`respond`].
    ///
    /// The spawned notification is resolved as well so no orphaned
    /// action-required item lingers in feeds.
    ///
    /// [`respond`]: ProgressRequestRepo::respond
    pub async fn cancel(
        pool: &PgPool,
        request_id: DbId,
        user_id: DbId,
    ) -> Result<Option<ProgressRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update = format!(
            "UPDATE progress_requests \
             SET status = '{}' \
             WHERE id = $1 AND status = '{}' \
             RETURNING {COLUMNS}",
            ProgressRequestStatus::Cancelled,
            ProgressRequestStatus::Pending,
        );
        let cancelled: Option<ProgressRequest> = sqlx::query_as(&update)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(cancelled) = cancelled else {
            return Ok(None);
        };

        if let Some(notification_id) = cancelled.notification_id {
            Self::resolve_notification(&mut tx, notification_id, user_id).await?;
        }

        tx.commit().await?;
        Ok(Some(cancelled))
    }

    /// Append an incremental progress update to a request.
    pub async fn add_update(
        pool: &PgPool,
        request_id: DbId,
        user_id: DbId,
        dto: &CreateProgressRequestUpdate,
    ) -> Result<ProgressRequestUpdate, sqlx::Error> {
        let query = format!(
            "INSERT INTO progress_request_updates \
                (progress_request_id, user_id, progress_info, progress_percentage, \
                 estimated_completion) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {UPDATE_COLUMNS}"
        );
        sqlx::query_as::<_, ProgressRequestUpdate>(&query)
            .bind(request_id)
            .bind(user_id)
            .bind(&dto.progress_info)
            .bind(dto.progress_percentage)
            .bind(dto.estimated_completion)
            .fetch_one(pool)
            .await
    }

    /// List the incremental updates for a request, oldest first.
    pub async fn list_updates(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<ProgressRequestUpdate>, sqlx::Error> {
        let query = format!(
            "SELECT {UPDATE_COLUMNS} FROM progress_request_updates \
             WHERE progress_request_id = $1 \
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ProgressRequestUpdate>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve the spawned notification, first-resolution-wins.
    async fn resolve_notification(
        tx: &mut Transaction<'_, Postgres>,
        notification_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notifications \
             SET is_resolved = TRUE, resolved_at = NOW(), resolved_by_user_id = $2 \
             WHERE id = $1 AND is_resolved = FALSE",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
