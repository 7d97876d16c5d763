//! Integration tests for the idempotent notification producers.

mod common;

use assert_matches::assert_matches;
use chrono::Timelike;
use common::{seed_profile, unsent_count};
use sqlx::PgPool;
use vitalis_core::notifications::NotificationKind;
use vitalis_db::repositories::{ActivityRepo, NotificationRepo};
use vitalis_notify::{NotificationScheduler, ScheduleOutcome};

// ---------------------------------------------------------------------------
// Morning briefing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn morning_briefing_schedules_exactly_once(pool: PgPool) {
    let user = seed_profile(&pool, Some("11987654321"), 1).await;
    let scheduler = NotificationScheduler::new(pool.clone());

    let first = scheduler.schedule_morning_briefing(user).await.unwrap();
    assert_matches!(first, ScheduleOutcome::Scheduled(_));

    let second = scheduler.schedule_morning_briefing(user).await.unwrap();
    assert_matches!(second, ScheduleOutcome::AlreadyPending);

    assert_eq!(
        unsent_count(&pool, user, NotificationKind::MorningBriefing).await,
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn morning_briefing_lands_tomorrow_at_the_fixed_hour(pool: PgPool) {
    let user = seed_profile(&pool, Some("11987654321"), 1).await;
    let scheduler = NotificationScheduler::new(pool.clone());

    let outcome = scheduler.schedule_morning_briefing(user).await.unwrap();
    let ScheduleOutcome::Scheduled(notification) = outcome else {
        panic!("expected a fresh briefing");
    };

    assert!(notification.scheduled_for > chrono::Utc::now());
    // 08:00 at UTC-3 is 11:00 UTC.
    assert_eq!(notification.scheduled_for.hour(), 11);
    assert_eq!(notification.scheduled_for.minute(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn morning_briefing_lists_recent_missions(pool: PgPool) {
    let user = seed_profile(&pool, Some("11987654321"), 1).await;
    ActivityRepo::record_completion(&pool, user, "Drink 2L of water")
        .await
        .unwrap();
    let scheduler = NotificationScheduler::new(pool.clone());

    let outcome = scheduler.schedule_morning_briefing(user).await.unwrap();
    let ScheduleOutcome::Scheduled(notification) = outcome else {
        panic!("expected a fresh briefing");
    };
    assert!(notification.body.contains("Drink 2L of water"));
}

// ---------------------------------------------------------------------------
// Weekly reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn weekly_reports_target_only_active_users(pool: PgPool) {
    let active = seed_profile(&pool, Some("11987654321"), 5).await;
    let inactive = seed_profile(&pool, Some("11912345678"), 0).await;
    let scheduler = NotificationScheduler::new(pool.clone());

    let scheduled = scheduler.schedule_weekly_reports().await.unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].user_id, active);

    assert_eq!(
        unsent_count(&pool, inactive, NotificationKind::WeeklyReport).await,
        0
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weekly_reports_are_deduplicated_per_user(pool: PgPool) {
    let user = seed_profile(&pool, Some("11987654321"), 5).await;
    let scheduler = NotificationScheduler::new(pool.clone());

    let first = scheduler.schedule_weekly_reports().await.unwrap();
    assert_eq!(first.len(), 1);

    let second = scheduler.schedule_weekly_reports().await.unwrap();
    assert!(second.is_empty());

    assert_eq!(
        unsent_count(&pool, user, NotificationKind::WeeklyReport).await,
        1
    );
}

// ---------------------------------------------------------------------------
// Inactivity re-engagement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactivity_targets_users_without_recent_missions(pool: PgPool) {
    let stale = seed_profile(&pool, Some("11987654321"), 0).await;
    let fresh = seed_profile(&pool, Some("11912345678"), 3).await;
    ActivityRepo::record_completion(&pool, fresh, "Morning walk")
        .await
        .unwrap();
    let scheduler = NotificationScheduler::new(pool.clone());

    let notified = scheduler.check_inactivity().await.unwrap();
    assert_eq!(notified, vec![stale]);

    // The nudge is immediately due.
    let due = NotificationRepo::due_batch(&pool, 50).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].user_id, stale);
    assert_eq!(due[0].kind, NotificationKind::ReEngagement.as_str());
    assert!(due[0].body.contains("3 days"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn inactivity_check_is_idempotent(pool: PgPool) {
    let stale = seed_profile(&pool, Some("11987654321"), 0).await;
    let scheduler = NotificationScheduler::new(pool.clone());

    let first = scheduler.check_inactivity().await.unwrap();
    assert_eq!(first, vec![stale]);

    let second = scheduler.check_inactivity().await.unwrap();
    assert!(second.is_empty());

    assert_eq!(
        unsent_count(&pool, stale, NotificationKind::ReEngagement).await,
        1
    );
}
