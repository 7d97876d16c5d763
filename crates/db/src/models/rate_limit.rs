//! Rate-limit entity models and the admission-decision shape.

use serde::Serialize;
use sqlx::FromRow;
use vitalis_core::types::{DbId, Timestamp, UserId};

/// A row from the `rate_limits` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RateLimit {
    pub id: DbId,
    pub user_id: UserId,
    pub operation: String,
    pub window_start: Timestamp,
    pub request_count: i32,
    pub max_requests: i32,
    pub window_hours: i32,
    pub is_blocked: bool,
    pub blocked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Result of one atomic check-and-increment.
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    /// Whether the request was admitted.
    pub allowed: bool,
    /// Requests left in the current window after this decision.
    pub remaining: i32,
    /// The effective limit applied.
    pub limit: i32,
    /// When the current window (or active block) expires.
    pub reset_at: Timestamp,
}

/// Per-operation aggregate for the stats endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OperationUsage {
    pub operation: String,
    pub tracked_pairs: i64,
    pub total_requests: i64,
}

/// Per-user aggregate for the heaviest-users listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserUsage {
    pub user_id: UserId,
    pub total_requests: i64,
}

/// Snapshot totals for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitTotals {
    pub total_tracked_pairs: i64,
    pub total_users: i64,
    pub blocked_count: i64,
}
