//! Repository for the `mission_completions` table (Activity-Signal
//! collaborator).

use sqlx::PgPool;
use vitalis_core::types::{DbId, UserId};

/// Provides mission-activity signals.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Record a completed mission for a user.
    pub async fn record_completion(
        pool: &PgPool,
        user_id: UserId,
        mission: &str,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO mission_completions (user_id, mission) \
             VALUES ($1, $2) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(mission)
        .fetch_one(pool)
        .await
    }

    /// Users with no completed mission in the last `days` days.
    pub async fn list_inactive_user_ids(
        pool: &PgPool,
        days: i32,
    ) -> Result<Vec<UserId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT p.user_id FROM profiles p \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM mission_completions mc \
                 WHERE mc.user_id = p.user_id \
                   AND mc.completed_at > NOW() - make_interval(days => $1) \
             ) \
             ORDER BY p.user_id",
        )
        .bind(days)
        .fetch_all(pool)
        .await
    }

    /// Titles of the user's most recent completed missions, newest first.
    /// Feeds the morning-briefing template.
    pub async fn recent_missions(
        pool: &PgPool,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT mission FROM mission_completions \
             WHERE user_id = $1 \
             ORDER BY completed_at DESC \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
