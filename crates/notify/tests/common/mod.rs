//! Shared helpers for notify integration tests.

#![allow(dead_code)]

use sqlx::PgPool;
use uuid::Uuid;
use vitalis_core::notifications::{NotificationKind, NotificationPriority};
use vitalis_core::types::UserId;
use vitalis_db::models::notification::{NewNotification, Notification};
use vitalis_db::repositories::NotificationRepo;

/// Insert a profile row, returning its user id.
pub async fn seed_profile(pool: &PgPool, phone: Option<&str>, streak_days: i32) -> UserId {
    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO profiles (user_id, full_name, phone, streak_days) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind("Test User")
    .bind(phone)
    .bind(streak_days)
    .execute(pool)
    .await
    .unwrap();
    user_id
}

/// Insert a due notification (scheduled `hours_ago` in the past).
pub async fn seed_due_notification(
    pool: &PgPool,
    user_id: UserId,
    kind: NotificationKind,
    priority: NotificationPriority,
    hours_ago: i64,
) -> Notification {
    let input = NewNotification {
        user_id,
        kind,
        title: format!("{kind} title"),
        body: "body".to_string(),
        priority,
        scheduled_for: chrono::Utc::now() - chrono::Duration::hours(hours_ago),
        action_url: None,
        metadata: serde_json::json!({}),
    };
    NotificationRepo::insert(pool, &input).await.unwrap()
}

/// Count unsent rows of one kind for a user.
pub async fn unsent_count(pool: &PgPool, user_id: UserId, kind: NotificationKind) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notification_queue \
         WHERE user_id = $1 AND kind = $2 AND sent_at IS NULL",
    )
    .bind(user_id)
    .bind(kind.as_str())
    .fetch_one(pool)
    .await
    .unwrap()
}
