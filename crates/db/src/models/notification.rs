//! Notification entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vitalis_core::notifications::{NotificationKind, NotificationPriority};
use vitalis_core::types::{DbId, Timestamp, UserId};

/// A row from the `notification_queue` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: UserId,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub priority: i16,
    pub scheduled_for: Timestamp,
    pub sent_at: Option<Timestamp>,
    pub action_url: Option<String>,
    pub metadata: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Notification {
    /// Decode the stored priority ordinal.
    pub fn priority(&self) -> NotificationPriority {
        NotificationPriority::from_i16(self.priority)
    }
}

/// DTO for inserting a notification.
#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub priority: NotificationPriority,
    pub scheduled_for: Timestamp,
    pub action_url: Option<String>,
    pub metadata: serde_json::Value,
}
