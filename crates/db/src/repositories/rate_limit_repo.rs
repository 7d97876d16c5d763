//! Repository for the `rate_limits` table.
//!
//! `check_and_increment` is the only write path hot enough to race: many
//! inbound requests can hit the same (user, operation) pair concurrently,
//! and two of them both observing `request_count = max - 1` must not both
//! be admitted. The whole read-evaluate-write sequence therefore runs in a
//! single transaction holding a `FOR UPDATE` row lock, and every time
//! comparison uses the database clock so the decision and the stored state
//! can never disagree about "now".

use sqlx::{FromRow, PgPool};
use vitalis_core::types::{DbId, Timestamp, UserId};

use crate::models::rate_limit::{
    CheckOutcome, OperationUsage, RateLimit, RateLimitTotals, UserUsage,
};

/// Column list for `rate_limits` queries.
const COLUMNS: &str = "\
    id, user_id, operation, window_start, request_count, max_requests, \
    window_hours, is_blocked, blocked_until, created_at, updated_at";

/// Window state read under the row lock.
#[derive(FromRow)]
struct LockedWindow {
    id: DbId,
    window_start: Timestamp,
    request_count: i32,
    is_blocked: bool,
    blocked_until: Option<Timestamp>,
    now: Timestamp,
}

/// Provides admission-control operations for rate-limit windows.
pub struct RateLimitRepo;

impl RateLimitRepo {
    /// Atomically evaluate and consume one admission slot for
    /// `(user_id, operation)`.
    ///
    /// The row is created lazily on first check. While an admin block is
    /// active the counter is left untouched and the call is denied. An
    /// expired window is reset to a fresh one (count 0, window_start = now)
    /// before evaluation; an expired block is cleared the same way.
    ///
    /// `max_requests` / `window_hours` are the effective limits for this
    /// call (caller override or static config) and are persisted so admin
    /// tooling sees what was actually enforced.
    pub async fn check_and_increment(
        pool: &PgPool,
        user_id: UserId,
        operation: &str,
        max_requests: i32,
        window_hours: i32,
    ) -> Result<CheckOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Lazy creation on first check for this pair.
        sqlx::query(
            "INSERT INTO rate_limits \
                 (user_id, operation, window_start, request_count, max_requests, window_hours) \
             VALUES ($1, $2, NOW(), 0, $3, $4) \
             ON CONFLICT (user_id, operation) DO NOTHING",
        )
        .bind(user_id)
        .bind(operation)
        .bind(max_requests)
        .bind(window_hours)
        .execute(&mut *tx)
        .await?;

        // The row lock serializes concurrent checks for the same pair.
        let row: LockedWindow = sqlx::query_as(
            "SELECT id, window_start, request_count, is_blocked, blocked_until, NOW() AS now \
             FROM rate_limits \
             WHERE user_id = $1 AND operation = $2 \
             FOR UPDATE",
        )
        .bind(user_id)
        .bind(operation)
        .fetch_one(&mut *tx)
        .await?;

        // An active admin block denies without touching the counter.
        if row.is_blocked {
            if let Some(blocked_until) = row.blocked_until {
                if row.now < blocked_until {
                    tx.commit().await?;
                    return Ok(CheckOutcome {
                        allowed: false,
                        remaining: 0,
                        limit: max_requests,
                        reset_at: blocked_until,
                    });
                }
            }
        }

        let window = chrono::Duration::hours(i64::from(window_hours));
        let expired = row.now - row.window_start > window;
        let (window_start, count_before) = if expired {
            (row.now, 0)
        } else {
            (row.window_start, row.request_count)
        };

        let allowed = count_before < max_requests;
        let new_count = if allowed { count_before + 1 } else { count_before };

        // Also clears an expired block and persists the effective limits.
        sqlx::query(
            "UPDATE rate_limits \
             SET window_start = $2, request_count = $3, max_requests = $4, \
                 window_hours = $5, is_blocked = FALSE, blocked_until = NULL, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(row.id)
        .bind(window_start)
        .bind(new_count)
        .bind(max_requests)
        .bind(window_hours)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CheckOutcome {
            allowed,
            remaining: (max_requests - new_count).max(0),
            limit: max_requests,
            reset_at: window_start + window,
        })
    }

    /// Block a (user, operation) pair for `block_hours`, independent of
    /// counter state. Re-blocking overwrites the deadline. Returns the new
    /// deadline.
    pub async fn block(
        pool: &PgPool,
        user_id: UserId,
        operation: &str,
        max_requests: i32,
        window_hours: i32,
        block_hours: i32,
    ) -> Result<Timestamp, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO rate_limits \
                 (user_id, operation, max_requests, window_hours, is_blocked, blocked_until) \
             VALUES ($1, $2, $3, $4, TRUE, NOW() + make_interval(hours => $5)) \
             ON CONFLICT (user_id, operation) DO UPDATE \
             SET is_blocked = TRUE, \
                 blocked_until = NOW() + make_interval(hours => $5), \
                 updated_at = NOW() \
             RETURNING blocked_until",
        )
        .bind(user_id)
        .bind(operation)
        .bind(max_requests)
        .bind(window_hours)
        .bind(block_hours)
        .fetch_one(pool)
        .await
    }

    /// Zero counters and clear block state for one operation, or for all of
    /// the user's operations when `operation` is `None`. Rows are kept, not
    /// deleted. Returns the number of rows reset.
    pub async fn reset(
        pool: &PgPool,
        user_id: UserId,
        operation: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = match operation {
            Some(op) => {
                sqlx::query(
                    "UPDATE rate_limits \
                     SET request_count = 0, window_start = NOW(), is_blocked = FALSE, \
                         blocked_until = NULL, updated_at = NOW() \
                     WHERE user_id = $1 AND operation = $2",
                )
                .bind(user_id)
                .bind(op)
                .execute(pool)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE rate_limits \
                     SET request_count = 0, window_start = NOW(), is_blocked = FALSE, \
                         blocked_until = NULL, updated_at = NOW() \
                     WHERE user_id = $1",
                )
                .bind(user_id)
                .execute(pool)
                .await?
            }
        };
        Ok(result.rows_affected())
    }

    /// Fetch one tracked window, if it exists.
    pub async fn find(
        pool: &PgPool,
        user_id: UserId,
        operation: &str,
    ) -> Result<Option<RateLimit>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM rate_limits WHERE user_id = $1 AND operation = $2");
        sqlx::query_as::<_, RateLimit>(&query)
            .bind(user_id)
            .bind(operation)
            .fetch_optional(pool)
            .await
    }

    /// Snapshot totals: tracked pairs, distinct users, currently blocked.
    pub async fn totals(pool: &PgPool) -> Result<RateLimitTotals, sqlx::Error> {
        let (total_tracked_pairs, total_users, blocked_count): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(DISTINCT user_id), \
                    COUNT(*) FILTER (WHERE is_blocked AND blocked_until > NOW()) \
             FROM rate_limits",
        )
        .fetch_one(pool)
        .await?;
        Ok(RateLimitTotals {
            total_tracked_pairs,
            total_users,
            blocked_count,
        })
    }

    /// Per-operation request totals, busiest first.
    pub async fn usage_by_operation(pool: &PgPool) -> Result<Vec<OperationUsage>, sqlx::Error> {
        sqlx::query_as(
            "SELECT operation, \
                    COUNT(*) AS tracked_pairs, \
                    COALESCE(SUM(request_count), 0)::BIGINT AS total_requests \
             FROM rate_limits \
             GROUP BY operation \
             ORDER BY total_requests DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// The `limit` heaviest users by total request count.
    pub async fn top_users(pool: &PgPool, limit: i64) -> Result<Vec<UserUsage>, sqlx::Error> {
        sqlx::query_as(
            "SELECT user_id, \
                    COALESCE(SUM(request_count), 0)::BIGINT AS total_requests \
             FROM rate_limits \
             GROUP BY user_id \
             ORDER BY total_requests DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
