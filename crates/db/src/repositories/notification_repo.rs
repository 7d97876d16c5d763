//! Repository for the `notification_queue` table.
//!
//! The due-batch selection deliberately has no claim step: overlapping
//! processor runs may select the same rows. Single-instance invocation is
//! assumed; see the processor documentation for the trade-off.

use sqlx::PgPool;
use vitalis_core::notifications::NotificationKind;
use vitalis_core::types::{DbId, UserId};

use crate::models::notification::{NewNotification, Notification};

/// Column list for `notification_queue` queries.
const COLUMNS: &str = "\
    id, user_id, kind, title, body, priority, scheduled_for, sent_at, \
    action_url, metadata, is_read, read_at, created_at";

/// Provides queue and read-tracking operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        input: &NewNotification,
    ) -> Result<Notification, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_queue \
                 (user_id, kind, title, body, priority, scheduled_for, action_url, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(input.user_id)
            .bind(input.kind.as_str())
            .bind(&input.title)
            .bind(&input.body)
            .bind(input.priority.as_i16())
            .bind(input.scheduled_for)
            .bind(&input.action_url)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Find an unsent notification of `kind` for a user, if one exists.
    ///
    /// With `future_only`, only rows still scheduled in the future count --
    /// the morning-briefing dedup check uses this so yesterday's overdue
    /// briefing does not suppress tomorrow's.
    pub async fn find_pending(
        pool: &PgPool,
        user_id: UserId,
        kind: NotificationKind,
        future_only: bool,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let filter = if future_only {
            "AND scheduled_for >= NOW()"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notification_queue \
             WHERE user_id = $1 AND kind = $2 AND sent_at IS NULL {filter} \
             LIMIT 1"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Select up to `limit` due notifications, most urgent then oldest-due
    /// first.
    pub async fn due_batch(pool: &PgPool, limit: i64) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_queue \
             WHERE sent_at IS NULL AND scheduled_for <= NOW() \
             ORDER BY priority DESC, scheduled_for ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Mark a notification as sent. The one mutation a queue row receives.
    pub async fn mark_sent(pool: &PgPool, notification_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE notification_queue \
             SET sent_at = NOW() \
             WHERE id = $1 AND sent_at IS NULL",
        )
        .bind(notification_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// List notifications for a user, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only {
            "AND is_read = FALSE"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notification_queue \
             WHERE user_id = $1 {filter} \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification was found for the given user and
    /// updated, `false` otherwise.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        user_id: UserId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notification_queue \
             SET is_read = TRUE, read_at = NOW() \
             WHERE id = $1 AND user_id = $2 AND is_read = FALSE",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a user. Returns how many
    /// were marked.
    pub async fn mark_all_read(pool: &PgPool, user_id: UserId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notification_queue \
             SET is_read = TRUE, read_at = NOW() \
             WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of unread notifications for a user.
    pub async fn unread_count(pool: &PgPool, user_id: UserId) -> Result<i64, sqlx::Error> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_queue WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }
}
