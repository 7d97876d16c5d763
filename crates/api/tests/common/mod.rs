//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;
use vitalis_api::config::ServerConfig;
use vitalis_api::router::build_app_router;
use vitalis_api::state::AppState;
use vitalis_core::types::UserId;
use vitalis_limiter::RateLimitGuard;
use vitalis_notify::{DeliveryMode, NotificationScheduler, QueueProcessor};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        delivery_mode: DeliveryMode::BestEffort,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses. No outbound channel is
/// configured: deliveries are accounted, not attempted.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        guard: Arc::new(RateLimitGuard::new(pool.clone())),
        scheduler: Arc::new(NotificationScheduler::new(pool.clone())),
        processor: Arc::new(QueueProcessor::new(pool, None, config.delivery_mode)),
    };

    build_app_router(state, &config)
}

/// Issue a GET request against the in-process app.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a JSON POST request against the in-process app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

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
