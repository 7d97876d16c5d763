//! Handlers for the `/throttle` resource.
//!
//! The request body is a tagged action union validated at the boundary:
//! a missing identifier or unknown operation is a 400 validation failure,
//! distinct from a 429 throttling denial.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use vitalis_core::operations::Operation;
use vitalis_core::types::UserId;
use vitalis_limiter::CheckDecision;

use crate::error::{validation, AppResult};
use crate::state::AppState;

/// Default admin block length, in hours.
const DEFAULT_BLOCK_HOURS: i32 = 24;

/// Tagged request body for `POST /api/v1/throttle`.
///
/// Identifier fields are `Option` so their absence surfaces as a 400 with
/// a named field instead of a generic body-rejection.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ThrottleAction {
    /// Atomic admission check; the sole interface other subsystems call
    /// before performing a rate-limited operation.
    Check {
        user_id: Option<UserId>,
        operation: Option<String>,
        max_requests: Option<i32>,
        window_hours: Option<i32>,
    },
    /// Zero counters and clear block state for one or all operations.
    Reset {
        user_id: Option<UserId>,
        operation: Option<String>,
    },
    /// Deny a (user, operation) pair outright until the deadline.
    Block {
        user_id: Option<UserId>,
        operation: Option<String>,
        block_hours: Option<i32>,
    },
    /// Administrative snapshot.
    Stats,
}

/// POST /api/v1/throttle
pub async fn dispatch(
    State(state): State<AppState>,
    Json(action): Json<ThrottleAction>,
) -> AppResult<Response> {
    match action {
        ThrottleAction::Check {
            user_id,
            operation,
            max_requests,
            window_hours,
        } => {
            let user_id = require_user(user_id)?;
            let operation = require_operation(operation)?;
            if max_requests.is_some_and(|m| m <= 0) {
                return Err(validation("max_requests must be positive"));
            }
            if window_hours.is_some_and(|w| w <= 0) {
                return Err(validation("window_hours must be positive"));
            }

            let decision = state
                .guard
                .check(user_id, operation, max_requests, window_hours)
                .await;
            Ok(check_response(operation, &decision))
        }

        ThrottleAction::Reset { user_id, operation } => {
            let user_id = require_user(user_id)?;
            let operation = operation.as_deref().map(parse_operation).transpose()?;

            let reset_windows = state.guard.reset(user_id, operation).await?;
            Ok(Json(json!({
                "success": true,
                "reset_windows": reset_windows,
            }))
            .into_response())
        }

        ThrottleAction::Block {
            user_id,
            operation,
            block_hours,
        } => {
            let user_id = require_user(user_id)?;
            let operation = require_operation(operation)?;
            let block_hours = block_hours.unwrap_or(DEFAULT_BLOCK_HOURS);
            if block_hours <= 0 {
                return Err(validation("block_hours must be positive"));
            }

            let blocked_until = state.guard.block(user_id, operation, block_hours).await?;
            Ok(Json(json!({
                "success": true,
                "blocked_until": blocked_until,
            }))
            .into_response())
        }

        ThrottleAction::Stats => {
            let stats = state.guard.stats().await?;
            Ok(Json(stats).into_response())
        }
    }
}

fn require_user(user_id: Option<UserId>) -> AppResult<UserId> {
    user_id.ok_or_else(|| validation("user_id is required"))
}

fn require_operation(operation: Option<String>) -> AppResult<Operation> {
    let raw = operation.ok_or_else(|| validation("operation is required"))?;
    parse_operation(&raw)
}

fn parse_operation(raw: &str) -> AppResult<Operation> {
    Operation::parse(raw).ok_or_else(|| validation(format!("unknown operation: {raw}")))
}

/// Render an admission decision with the conventional rate-limit headers.
/// A denial is a 429 with a message naming the limit, the operation, and
/// the reset time.
fn check_response(operation: Operation, decision: &CheckDecision) -> Response {
    let headers = [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.reset_at.timestamp().to_string()),
    ];

    if decision.allowed {
        (headers, Json(json!(decision))).into_response()
    } else {
        let message = format!(
            "Rate limit of {} requests exceeded for operation {}. Try again after {}.",
            decision.limit,
            operation,
            decision.reset_at.to_rfc3339(),
        );
        let mut body = json!(decision);
        body["error"] = json!(message);
        (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response()
    }
}
