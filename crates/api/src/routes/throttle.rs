//! Route definitions for the `/throttle` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::throttle;
use crate::state::AppState;

/// Routes mounted at `/throttle`.
///
/// ```text
/// POST   /    -> dispatch (tagged action union: check | reset | block | stats)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(throttle::dispatch))
}
