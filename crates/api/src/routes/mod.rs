//! Route definitions, grouped by resource.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod notifications;
pub mod throttle;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/throttle", throttle::router())
        .nest("/notifications", notifications::router())
}
