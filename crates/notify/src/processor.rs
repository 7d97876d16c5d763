//! Batch consumer for the notification queue.
//!
//! `process_pending` drains due rows most-urgent-first, sequentially, with
//! a fixed spacing delay between external sends so a large batch cannot
//! trip the provider's own throughput limits. Each record is processed in
//! isolation: one failure never aborts the batch.
//!
//! There is no cross-instance claim step -- two overlapping runs may select
//! and send the same record. Invocations are externally triggered and
//! assumed non-overlapping; the delivery guarantee is at-least-zero,
//! at-most-a-few, never exactly-once.

use std::sync::Arc;
use std::time::Duration;

use vitalis_core::types::DbId;
use vitalis_db::models::notification::Notification;
use vitalis_db::repositories::{NotificationRepo, ProfileRepo};
use vitalis_db::DbPool;

use crate::channel::{ChannelError, DeliveryMode, NotificationChannel};

/// Default batch size for one processing run.
pub const DEFAULT_BATCH_LIMIT: i64 = 50;

/// Pause between successive external sends within one batch.
const SEND_SPACING: Duration = Duration::from_millis(500);

/// Per-record processing failure.
#[derive(Debug, thiserror::Error)]
enum ProcessError {
    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Delivery(#[from] ChannelError),
}

/// Outcome of one processing run.
#[derive(Debug, Default)]
pub struct ProcessSummary {
    /// Records marked sent this run (delivered, or accounted without
    /// delivery under the best-effort policy).
    pub processed: Vec<DbId>,
    /// Records left unsent for a future run.
    pub failed: Vec<DbId>,
}

/// Drains due notifications and dispatches them through the outbound
/// channel.
pub struct QueueProcessor {
    pool: DbPool,
    channel: Option<Arc<dyn NotificationChannel>>,
    delivery_mode: DeliveryMode,
}

impl QueueProcessor {
    /// Create a new processor.
    ///
    /// `channel` is `None` when outbound delivery is not configured; due
    /// records are then accounted without a send attempt, keeping the
    /// queue drained in every environment.
    pub fn new(
        pool: DbPool,
        channel: Option<Arc<dyn NotificationChannel>>,
        delivery_mode: DeliveryMode,
    ) -> Self {
        Self {
            pool,
            channel,
            delivery_mode,
        }
    }

    /// Process up to `batch_limit` due notifications.
    ///
    /// Returns which ids were marked sent and which remain unsent. The
    /// only fallible part at this level is the due-batch selection itself;
    /// per-record failures land in `failed`.
    pub async fn process_pending(&self, batch_limit: i64) -> Result<ProcessSummary, sqlx::Error> {
        let batch = NotificationRepo::due_batch(&self.pool, batch_limit).await?;
        let total = batch.len();
        let mut summary = ProcessSummary::default();

        for (index, notification) in batch.iter().enumerate() {
            match self.process_one(notification).await {
                Ok(sent_externally) => {
                    summary.processed.push(notification.id);
                    // Space out provider traffic; no pause after the last
                    // record or when nothing left the process.
                    if sent_externally && index + 1 < total {
                        tokio::time::sleep(SEND_SPACING).await;
                    }
                }
                Err(e) => {
                    tracing::error!(
                        notification_id = notification.id,
                        user_id = %notification.user_id,
                        error = %e,
                        "Failed to process notification, leaving unsent"
                    );
                    summary.failed.push(notification.id);
                }
            }
        }

        tracing::info!(
            processed = summary.processed.len(),
            failed = summary.failed.len(),
            "Notification batch complete"
        );
        Ok(summary)
    }

    /// Handle a single record. Returns whether an external send was
    /// attempted (used for outbound spacing).
    async fn process_one(&self, notification: &Notification) -> Result<bool, ProcessError> {
        let profile = ProfileRepo::find(&self.pool, notification.user_id).await?;
        let phone = profile.and_then(|p| p.phone);

        let Some(phone) = phone else {
            // A contactless user must not wedge the queue: account the
            // record as sent without attempting delivery.
            tracing::warn!(
                notification_id = notification.id,
                user_id = %notification.user_id,
                "No contact address, marking sent without delivery"
            );
            NotificationRepo::mark_sent(&self.pool, notification.id).await?;
            return Ok(false);
        };

        let Some(channel) = &self.channel else {
            tracing::warn!(
                notification_id = notification.id,
                "Outbound channel not configured, marking sent without delivery"
            );
            NotificationRepo::mark_sent(&self.pool, notification.id).await?;
            return Ok(false);
        };

        let text = format!("*{}*\n\n{}", notification.title, notification.body);
        if let Err(e) = channel.send_text(&phone, &text).await {
            match self.delivery_mode {
                DeliveryMode::BestEffort => {
                    tracing::warn!(
                        notification_id = notification.id,
                        error = %e,
                        "Delivery failed; best-effort policy accounts the record as sent"
                    );
                }
                DeliveryMode::Strict => return Err(e.into()),
            }
        }

        NotificationRepo::mark_sent(&self.pool, notification.id).await?;
        Ok(true)
    }
}
