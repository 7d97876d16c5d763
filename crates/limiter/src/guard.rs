//! The admission guard.

use serde::Serialize;
use vitalis_core::operations::{rate_limit_config, Operation};
use vitalis_core::types::{Timestamp, UserId};
use vitalis_db::models::rate_limit::{OperationUsage, RateLimitTotals, UserUsage};
use vitalis_db::repositories::RateLimitRepo;
use vitalis_db::DbPool;

/// How many heaviest users the stats snapshot lists.
const TOP_USERS: i64 = 10;

/// An admission decision for one request.
#[derive(Debug, Clone, Serialize)]
pub struct CheckDecision {
    /// Whether the request was admitted.
    pub allowed: bool,
    /// Requests left in the current window after this decision.
    pub remaining: i32,
    /// The effective limit applied.
    pub limit: i32,
    /// When the current window (or active block) expires.
    pub reset_at: Timestamp,
    /// Set when the store was unreachable and the guard failed open.
    pub degraded: bool,
}

/// One entry of the static limit configuration, echoed by [`stats`].
///
/// [`stats`]: RateLimitGuard::stats
#[derive(Debug, Clone, Serialize)]
pub struct OperationConfig {
    pub operation: Operation,
    pub max_requests: i32,
    pub window_hours: i32,
}

/// Administrative snapshot of the throttling domain.
#[derive(Debug, Clone, Serialize)]
pub struct GuardStats {
    pub total_tracked_pairs: i64,
    pub total_users: i64,
    pub blocked_count: i64,
    pub operations: Vec<OperationUsage>,
    pub top_users: Vec<UserUsage>,
    pub configs: Vec<OperationConfig>,
}

/// Atomic check-and-increment admission decisions plus the administrative
/// block/reset/stats operations.
pub struct RateLimitGuard {
    pool: DbPool,
}

impl RateLimitGuard {
    /// Create a new guard backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Decide whether one more `operation` request from `user_id` is
    /// admitted, consuming a slot if so.
    ///
    /// Effective limits are the caller's overrides where given, else the
    /// static per-operation configuration. This call is infallible by
    /// policy: a store failure is logged and the request is admitted with
    /// `degraded = true` -- a throttling outage must never become a product
    /// outage.
    pub async fn check(
        &self,
        user_id: UserId,
        operation: Operation,
        max_requests: Option<i32>,
        window_hours: Option<i32>,
    ) -> CheckDecision {
        let config = rate_limit_config(operation);
        let limit = max_requests.unwrap_or(config.max_requests);
        let window_hours = window_hours.unwrap_or(config.window_hours);

        match RateLimitRepo::check_and_increment(
            &self.pool,
            user_id,
            operation.as_str(),
            limit,
            window_hours,
        )
        .await
        {
            Ok(outcome) => CheckDecision {
                allowed: outcome.allowed,
                remaining: outcome.remaining,
                limit: outcome.limit,
                reset_at: outcome.reset_at,
                degraded: false,
            },
            Err(e) => {
                tracing::error!(
                    %user_id,
                    operation = %operation,
                    error = %e,
                    "Rate-limit store unavailable, failing open"
                );
                CheckDecision {
                    allowed: true,
                    remaining: limit,
                    limit,
                    reset_at: chrono::Utc::now()
                        + chrono::Duration::hours(i64::from(window_hours)),
                    degraded: true,
                }
            }
        }
    }

    /// Block a (user, operation) pair for `block_hours`, independent of its
    /// counter state. Returns the new deadline.
    pub async fn block(
        &self,
        user_id: UserId,
        operation: Operation,
        block_hours: i32,
    ) -> Result<Timestamp, sqlx::Error> {
        let config = rate_limit_config(operation);
        let blocked_until = RateLimitRepo::block(
            &self.pool,
            user_id,
            operation.as_str(),
            config.max_requests,
            config.window_hours,
            block_hours,
        )
        .await?;
        tracing::info!(
            %user_id,
            operation = %operation,
            %blocked_until,
            "Blocked user for operation"
        );
        Ok(blocked_until)
    }

    /// Zero counters and clear block state for one operation, or all of the
    /// user's operations. Returns how many windows were reset.
    pub async fn reset(
        &self,
        user_id: UserId,
        operation: Option<Operation>,
    ) -> Result<u64, sqlx::Error> {
        let reset_rows =
            RateLimitRepo::reset(&self.pool, user_id, operation.map(|op| op.as_str())).await?;
        tracing::info!(%user_id, operation = ?operation, reset_rows, "Reset rate-limit state");
        Ok(reset_rows)
    }

    /// Administrative snapshot: totals, per-operation usage, heaviest
    /// users, and the static configuration table.
    pub async fn stats(&self) -> Result<GuardStats, sqlx::Error> {
        let RateLimitTotals {
            total_tracked_pairs,
            total_users,
            blocked_count,
        } = RateLimitRepo::totals(&self.pool).await?;
        let operations = RateLimitRepo::usage_by_operation(&self.pool).await?;
        let top_users = RateLimitRepo::top_users(&self.pool, TOP_USERS).await?;

        let configs = Operation::all()
            .iter()
            .map(|&operation| {
                let config = rate_limit_config(operation);
                OperationConfig {
                    operation,
                    max_requests: config.max_requests,
                    window_hours: config.window_hours,
                }
            })
            .collect();

        Ok(GuardStats {
            total_tracked_pairs,
            total_users,
            blocked_count,
            operations,
            top_users,
            configs,
        })
    }
}
