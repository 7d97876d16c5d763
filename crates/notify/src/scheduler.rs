//! Idempotent notification producers.
//!
//! Every producer guarantees at-most-one-pending-per-kind for a user by
//! checking for an existing unsent row before inserting. The guarantee
//! lives here, not in the schema: ad-hoc producers (achievements, health
//! alerts) are allowed to enqueue freely through [`NotificationScheduler::enqueue`].
//!
//! Slot times are fixed in the product's home offset (UTC-3; Brazil has
//! not observed DST since 2019), mirroring the fixed cron hours of the
//! legacy pipeline.

use chrono::{Datelike, TimeZone, Weekday};
use vitalis_core::notifications::{NotificationKind, NotificationPriority};
use vitalis_core::types::{Timestamp, UserId};
use vitalis_db::models::notification::{NewNotification, Notification};
use vitalis_db::repositories::{ActivityRepo, NotificationRepo, ProfileRepo};
use vitalis_db::DbPool;

use crate::templates;

/// Local hour of the daily morning briefing.
pub const MORNING_BRIEFING_HOUR: u32 = 8;

/// Weekly report slot: Sunday evening, local time.
pub const WEEKLY_REPORT_WEEKDAY: Weekday = Weekday::Sun;
pub const WEEKLY_REPORT_HOUR: u32 = 18;

/// Days without a completed mission before a user counts as inactive.
pub const INACTIVITY_THRESHOLD_DAYS: i32 = 3;

/// The product's home UTC offset, in hours.
const HOME_OFFSET_HOURS: i64 = -3;

/// Outcome of an idempotent scheduling call.
///
/// `AlreadyPending` is a successful no-op, reported distinctly so callers
/// can tell a fresh insert from a dedup skip.
#[derive(Debug)]
pub enum ScheduleOutcome {
    Scheduled(Notification),
    AlreadyPending,
}

/// Produces future notification rows without ever duplicating a pending
/// (user, kind) pair.
pub struct NotificationScheduler {
    pool: DbPool,
}

impl NotificationScheduler {
    /// Create a new scheduler with the given database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Queue tomorrow's morning briefing for one user.
    ///
    /// The dedup check is scoped to future rows so an overdue, not-yet-sent
    /// briefing does not suppress tomorrow's.
    pub async fn schedule_morning_briefing(
        &self,
        user_id: UserId,
    ) -> Result<ScheduleOutcome, sqlx::Error> {
        let pending = NotificationRepo::find_pending(
            &self.pool,
            user_id,
            NotificationKind::MorningBriefing,
            true,
        )
        .await?;
        if pending.is_some() {
            tracing::debug!(%user_id, "Morning briefing already scheduled, skipping");
            return Ok(ScheduleOutcome::AlreadyPending);
        }

        let missions = ActivityRepo::recent_missions(&self.pool, user_id, 3).await?;
        let template = templates::morning_briefing(&missions);
        let notification = self
            .enqueue(NewNotification {
                user_id,
                kind: NotificationKind::MorningBriefing,
                title: template.title,
                body: template.body,
                priority: NotificationPriority::Medium,
                scheduled_for: next_daily_slot(chrono::Utc::now(), MORNING_BRIEFING_HOUR),
                action_url: Some("/missions".to_string()),
                metadata: serde_json::json!({ "missions": missions }),
            })
            .await?;
        Ok(ScheduleOutcome::Scheduled(notification))
    }

    /// Queue the next weekly report for every active user (positive streak
    /// signal). Returns the newly scheduled rows; users with a pending
    /// report are skipped.
    pub async fn schedule_weekly_reports(&self) -> Result<Vec<Notification>, sqlx::Error> {
        let active = ProfileRepo::list_active(&self.pool).await?;
        let scheduled_for =
            next_weekly_slot(chrono::Utc::now(), WEEKLY_REPORT_WEEKDAY, WEEKLY_REPORT_HOUR);

        let mut scheduled = Vec::new();
        for profile in active {
            let pending = NotificationRepo::find_pending(
                &self.pool,
                profile.user_id,
                NotificationKind::WeeklyReport,
                false,
            )
            .await?;
            if pending.is_some() {
                continue;
            }

            let template = templates::weekly_report();
            let notification = self
                .enqueue(NewNotification {
                    user_id: profile.user_id,
                    kind: NotificationKind::WeeklyReport,
                    title: template.title,
                    body: template.body,
                    priority: NotificationPriority::Low,
                    scheduled_for,
                    action_url: Some("/reports".to_string()),
                    metadata: serde_json::json!({}),
                })
                .await?;
            scheduled.push(notification);
        }

        tracing::info!(count = scheduled.len(), "Scheduled weekly reports");
        Ok(scheduled)
    }

    /// Queue an immediately-due re-engagement nudge for every user with no
    /// completed mission in the last [`INACTIVITY_THRESHOLD_DAYS`] days.
    /// Returns the user ids that were notified this run.
    pub async fn check_inactivity(&self) -> Result<Vec<UserId>, sqlx::Error> {
        let inactive =
            ActivityRepo::list_inactive_user_ids(&self.pool, INACTIVITY_THRESHOLD_DAYS).await?;

        let mut notified = Vec::new();
        for user_id in inactive {
            let pending = NotificationRepo::find_pending(
                &self.pool,
                user_id,
                NotificationKind::ReEngagement,
                false,
            )
            .await?;
            if pending.is_some() {
                continue;
            }

            let template = templates::re_engagement(i64::from(INACTIVITY_THRESHOLD_DAYS));
            self.enqueue(NewNotification {
                user_id,
                kind: NotificationKind::ReEngagement,
                title: template.title,
                body: template.body,
                priority: NotificationPriority::Medium,
                scheduled_for: chrono::Utc::now(),
                action_url: Some("/missions".to_string()),
                metadata: serde_json::json!({
                    "days_inactive": INACTIVITY_THRESHOLD_DAYS
                }),
            })
            .await?;
            notified.push(user_id);
        }

        tracing::info!(count = notified.len(), "Queued re-engagement notifications");
        Ok(notified)
    }

    /// Insert one notification row. The generic producer behind the
    /// scheduled kinds, also used by other subsystems for ad-hoc kinds
    /// (achievements, reminders, health alerts).
    pub async fn enqueue(&self, input: NewNotification) -> Result<Notification, sqlx::Error> {
        let notification = NotificationRepo::insert(&self.pool, &input).await?;
        tracing::debug!(
            notification_id = notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            "Notification queued"
        );
        Ok(notification)
    }
}

// ---------------------------------------------------------------------------
// Slot math
// ---------------------------------------------------------------------------

fn to_local(now: Timestamp) -> chrono::NaiveDateTime {
    (now + chrono::Duration::hours(HOME_OFFSET_HOURS)).naive_utc()
}

fn to_utc(local: chrono::NaiveDateTime) -> Timestamp {
    chrono::Utc.from_utc_datetime(&(local - chrono::Duration::hours(HOME_OFFSET_HOURS)))
}

/// Next day at `hour:00` local time.
pub fn next_daily_slot(now: Timestamp, hour: u32) -> Timestamp {
    let local_now = to_local(now);
    let tomorrow = local_now.date() + chrono::Duration::days(1);
    let slot = tomorrow
        .and_hms_opt(hour, 0, 0)
        .expect("slot hour is in range");
    to_utc(slot)
}

/// Next occurrence of `weekday` at `hour:00` local time, strictly in the
/// future.
pub fn next_weekly_slot(now: Timestamp, weekday: Weekday, hour: u32) -> Timestamp {
    let local_now = to_local(now);
    let today = local_now.date();
    let days_ahead = (i64::from(weekday.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday()))
    .rem_euclid(7);

    let mut date = today + chrono::Duration::days(days_ahead);
    let mut slot = date.and_hms_opt(hour, 0, 0).expect("slot hour is in range");
    if slot <= local_now {
        date += chrono::Duration::days(7);
        slot = date.and_hms_opt(hour, 0, 0).expect("slot hour is in range");
    }
    to_utc(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Timestamp {
        chrono::Utc
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .unwrap()
    }

    #[test]
    fn daily_slot_is_tomorrow_morning_in_home_time() {
        // 2026-08-06 12:00 UTC is 09:00 local; tomorrow 08:00 local is
        // 11:00 UTC.
        let slot = next_daily_slot(at(2026, 8, 6, 12, 0), MORNING_BRIEFING_HOUR);
        assert_eq!(slot, at(2026, 8, 7, 11, 0));
    }

    #[test]
    fn daily_slot_handles_the_local_date_boundary() {
        // 2026-08-07 02:30 UTC is still 2026-08-06 23:30 local, so the
        // next briefing is the local 7th, not the 8th.
        let slot = next_daily_slot(at(2026, 8, 7, 2, 30), MORNING_BRIEFING_HOUR);
        assert_eq!(slot, at(2026, 8, 7, 11, 0));
    }

    #[test]
    fn weekly_slot_lands_on_the_configured_weekday() {
        // 2026-08-06 is a Thursday; the following Sunday is 2026-08-09.
        // 18:00 local is 21:00 UTC.
        let slot = next_weekly_slot(
            at(2026, 8, 6, 12, 0),
            WEEKLY_REPORT_WEEKDAY,
            WEEKLY_REPORT_HOUR,
        );
        assert_eq!(slot, at(2026, 8, 9, 21, 0));
    }

    #[test]
    fn weekly_slot_already_past_rolls_to_next_week() {
        // Sunday 2026-08-09 22:00 UTC is 19:00 local, past the slot.
        let slot = next_weekly_slot(
            at(2026, 8, 9, 22, 0),
            WEEKLY_REPORT_WEEKDAY,
            WEEKLY_REPORT_HOUR,
        );
        assert_eq!(slot, at(2026, 8, 16, 21, 0));
    }
}
