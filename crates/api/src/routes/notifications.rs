//! Route definitions for the `/notifications` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// POST   /                              -> dispatch (tagged action union)
///
/// GET    /{user_id}                     -> list
/// POST   /{user_id}/read-all            -> mark_all_read
/// GET    /{user_id}/unread-count        -> unread_count
/// POST   /{user_id}/{id}/read           -> mark_read
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Control actions invoked by external time triggers.
        .route("/", post(notifications::dispatch))
        // Read tracking.
        .route("/{user_id}", get(notifications::list))
        .route("/{user_id}/read-all", post(notifications::mark_all_read))
        .route("/{user_id}/unread-count", get(notifications::unread_count))
        .route("/{user_id}/{id}/read", post(notifications::mark_read))
}
