use std::sync::Arc;

use vitalis_limiter::RateLimitGuard;
use vitalis_notify::{NotificationScheduler, QueueProcessor};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vitalis_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Admission guard for rate-limited operations.
    pub guard: Arc<RateLimitGuard>,
    /// Idempotent notification producers.
    pub scheduler: Arc<NotificationScheduler>,
    /// Batch consumer for the notification queue.
    pub processor: Arc<QueueProcessor>,
}
