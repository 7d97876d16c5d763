//! Handlers for the `/notifications` resource: the control actions invoked
//! by external time triggers, plus per-user read tracking.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use vitalis_core::error::CoreError;
use vitalis_core::types::{DbId, UserId};
use vitalis_db::repositories::NotificationRepo;
use vitalis_notify::{ScheduleOutcome, DEFAULT_BATCH_LIMIT};

use crate::error::{validation, AppError, AppResult};
use crate::state::AppState;

/// Upper bound on one processing run, whatever the caller asks for.
const MAX_BATCH_LIMIT: i64 = 200;

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for notification listing.
const DEFAULT_LIMIT: i64 = 50;

/// Tagged request body for `POST /api/v1/notifications`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NotificationAction {
    /// Drain due notifications through the outbound channel.
    ProcessPending { batch_limit: Option<i64> },
    /// Queue tomorrow's briefing for one user (idempotent).
    ScheduleMorningBriefing { user_id: Option<UserId> },
    /// Queue re-engagement nudges for inactive users (idempotent).
    CheckInactivity,
    /// Queue the next weekly report for active users (idempotent).
    ScheduleWeeklyReports,
}

/// POST /api/v1/notifications
pub async fn dispatch(
    State(state): State<AppState>,
    Json(action): Json<NotificationAction>,
) -> AppResult<Json<serde_json::Value>> {
    match action {
        NotificationAction::ProcessPending { batch_limit } => {
            let limit = batch_limit.unwrap_or(DEFAULT_BATCH_LIMIT);
            if limit <= 0 || limit > MAX_BATCH_LIMIT {
                return Err(validation(format!(
                    "batch_limit must be between 1 and {MAX_BATCH_LIMIT}"
                )));
            }

            let summary = state.processor.process_pending(limit).await?;
            Ok(Json(json!({
                "success": true,
                "processed": summary.processed.len(),
                "failed": summary.failed.len(),
                "processed_ids": summary.processed,
                "failed_ids": summary.failed,
            })))
        }

        NotificationAction::ScheduleMorningBriefing { user_id } => {
            let user_id = user_id.ok_or_else(|| validation("user_id is required"))?;
            match state.scheduler.schedule_morning_briefing(user_id).await? {
                ScheduleOutcome::Scheduled(notification) => Ok(Json(json!({
                    "success": true,
                    "notification": notification,
                }))),
                ScheduleOutcome::AlreadyPending => Ok(Json(json!({
                    "success": true,
                    "message": "already scheduled",
                }))),
            }
        }

        NotificationAction::CheckInactivity => {
            let user_ids = state.scheduler.check_inactivity().await?;
            Ok(Json(json!({
                "success": true,
                "inactive_users_notified": user_ids.len(),
                "user_ids": user_ids,
            })))
        }

        NotificationAction::ScheduleWeeklyReports => {
            let scheduled = state.scheduler.schedule_weekly_reports().await?;
            Ok(Json(json!({
                "success": true,
                "scheduled_reports": scheduled.len(),
            })))
        }
    }
}

// ---------------------------------------------------------------------------
// Read tracking
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/v1/notifications/{user_id}`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// GET /api/v1/notifications/{user_id}
///
/// List a user's notifications, newest first, with optional filtering.
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(params): Query<NotificationQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);
    let unread_only = params.unread_only.unwrap_or(false);

    let notifications =
        NotificationRepo::list_for_user(&state.pool, user_id, unread_only, limit, offset).await?;

    Ok(Json(json!({ "data": notifications })))
}

/// POST /api/v1/notifications/{user_id}/{id}/read
///
/// Mark a single notification as read. Returns 204 No Content on success,
/// or 404 if the notification does not belong to the given user.
pub async fn mark_read(
    State(state): State<AppState>,
    Path((user_id, notification_id)): Path<(UserId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let found = NotificationRepo::mark_read(&state.pool, notification_id, user_id).await?;

    if !found {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/notifications/{user_id}/read-all
///
/// Mark all of a user's notifications as read. Returns how many were
/// marked.
pub async fn mark_all_read(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::mark_all_read(&state.pool, user_id).await?;

    Ok(Json(json!({
        "data": { "marked_read": count }
    })))
}

/// GET /api/v1/notifications/{user_id}/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<serde_json::Value>> {
    let count = NotificationRepo::unread_count(&state.pool, user_id).await?;

    Ok(Json(json!({
        "data": { "count": count }
    })))
}
