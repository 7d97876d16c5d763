//! Integration tests for the rate-limit repository: window bounds, expiry,
//! blocking, reset, and the concurrency invariant.
//!
//! All time simulation happens by editing rows -- the repository evaluates
//! against the database clock, so backdating `window_start` or
//! `blocked_until` is equivalent to advancing time.

use sqlx::PgPool;
use uuid::Uuid;
use vitalis_db::repositories::RateLimitRepo;

const OP: &str = "ai_analysis";

// ---------------------------------------------------------------------------
// Window bound
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn three_checks_allowed_then_fourth_denied(pool: PgPool) {
    let user = Uuid::new_v4();

    for expected_remaining in [2, 1, 0] {
        let outcome = RateLimitRepo::check_and_increment(&pool, user, OP, 3, 24)
            .await
            .unwrap();
        assert!(outcome.allowed);
        assert_eq!(outcome.remaining, expected_remaining);
        assert_eq!(outcome.limit, 3);
    }

    let denied = RateLimitRepo::check_and_increment(&pool, user, OP, 3, 24)
        .await
        .unwrap();
    assert!(!denied.allowed);
    assert_eq!(denied.remaining, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn row_is_created_lazily_on_first_check(pool: PgPool) {
    let user = Uuid::new_v4();

    assert!(RateLimitRepo::find(&pool, user, OP).await.unwrap().is_none());

    RateLimitRepo::check_and_increment(&pool, user, OP, 5, 24)
        .await
        .unwrap();

    let row = RateLimitRepo::find(&pool, user, OP).await.unwrap().unwrap();
    assert_eq!(row.request_count, 1);
    assert_eq!(row.max_requests, 5);
    assert_eq!(row.window_hours, 24);
}

// ---------------------------------------------------------------------------
// Window expiry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_window_resets_to_fresh_count(pool: PgPool) {
    let user = Uuid::new_v4();

    // Exhaust the window.
    for _ in 0..3 {
        RateLimitRepo::check_and_increment(&pool, user, OP, 3, 24)
            .await
            .unwrap();
    }

    // Advance time past the window by backdating its start.
    sqlx::query(
        "UPDATE rate_limits SET window_start = NOW() - INTERVAL '25 hours' \
         WHERE user_id = $1 AND operation = $2",
    )
    .bind(user)
    .bind(OP)
    .execute(&pool)
    .await
    .unwrap();

    let outcome = RateLimitRepo::check_and_increment(&pool, user, OP, 3, 24)
        .await
        .unwrap();
    assert!(outcome.allowed);
    assert_eq!(outcome.remaining, 2);
}

// ---------------------------------------------------------------------------
// Blocking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn active_block_denies_regardless_of_count(pool: PgPool) {
    let user = Uuid::new_v4();

    // One request used, well under the limit.
    RateLimitRepo::check_and_increment(&pool, user, OP, 10, 24)
        .await
        .unwrap();

    let blocked_until = RateLimitRepo::block(&pool, user, OP, 10, 24, 1)
        .await
        .unwrap();

    let denied = RateLimitRepo::check_and_increment(&pool, user, OP, 10, 24)
        .await
        .unwrap();
    assert!(!denied.allowed);
    assert_eq!(denied.reset_at, blocked_until);

    // The counter must not have moved while blocked.
    let row = RateLimitRepo::find(&pool, user, OP).await.unwrap().unwrap();
    assert_eq!(row.request_count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_block_falls_back_to_window_state(pool: PgPool) {
    let user = Uuid::new_v4();

    RateLimitRepo::block(&pool, user, OP, 10, 24, 1).await.unwrap();

    // Advance time past the deadline.
    sqlx::query(
        "UPDATE rate_limits SET blocked_until = NOW() - INTERVAL '1 second' \
         WHERE user_id = $1 AND operation = $2",
    )
    .bind(user)
    .bind(OP)
    .execute(&pool)
    .await
    .unwrap();

    let outcome = RateLimitRepo::check_and_increment(&pool, user, OP, 10, 24)
        .await
        .unwrap();
    assert!(outcome.allowed);

    // The expired block must have been cleared.
    let row = RateLimitRepo::find(&pool, user, OP).await.unwrap().unwrap();
    assert!(!row.is_blocked);
    assert!(row.blocked_until.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reblocking_overwrites_the_deadline(pool: PgPool) {
    let user = Uuid::new_v4();

    let first = RateLimitRepo::block(&pool, user, OP, 10, 24, 1).await.unwrap();
    let second = RateLimitRepo::block(&pool, user, OP, 10, 24, 24).await.unwrap();
    assert!(second > first);
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_behaves_like_first_ever_call(pool: PgPool) {
    let user = Uuid::new_v4();

    for _ in 0..3 {
        RateLimitRepo::check_and_increment(&pool, user, OP, 3, 24)
            .await
            .unwrap();
    }
    RateLimitRepo::block(&pool, user, OP, 3, 24, 1).await.unwrap();

    let reset_rows = RateLimitRepo::reset(&pool, user, Some(OP)).await.unwrap();
    assert_eq!(reset_rows, 1);

    let outcome = RateLimitRepo::check_and_increment(&pool, user, OP, 3, 24)
        .await
        .unwrap();
    assert!(outcome.allowed);
    assert_eq!(outcome.remaining, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_without_operation_clears_all_of_the_users_rows(pool: PgPool) {
    let user = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    RateLimitRepo::check_and_increment(&pool, user, "sofia_chat", 5, 24)
        .await
        .unwrap();
    RateLimitRepo::check_and_increment(&pool, user, "medical_exam", 5, 24)
        .await
        .unwrap();
    RateLimitRepo::check_and_increment(&pool, other_user, "sofia_chat", 5, 24)
        .await
        .unwrap();

    let reset_rows = RateLimitRepo::reset(&pool, user, None).await.unwrap();
    assert_eq!(reset_rows, 2);

    // The other user's window is untouched.
    let row = RateLimitRepo::find(&pool, other_user, "sofia_chat")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.request_count, 1);
}

// ---------------------------------------------------------------------------
// Concurrency invariant
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_checks_never_admit_more_than_the_limit(pool: PgPool) {
    let user = Uuid::new_v4();
    let max_requests = 3;
    let callers = 10;

    let mut handles = Vec::new();
    for _ in 0..callers {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            RateLimitRepo::check_and_increment(&pool, user, OP, max_requests, 24).await
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        if outcome.allowed {
            allowed += 1;
        }
    }

    assert_eq!(allowed, max_requests);

    let row = RateLimitRepo::find(&pool, user, OP).await.unwrap().unwrap();
    assert_eq!(row.request_count, max_requests);
}

// ---------------------------------------------------------------------------
// Stats aggregates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_reflect_tracked_pairs_blocks_and_heaviest_users(pool: PgPool) {
    let heavy = Uuid::new_v4();
    let light = Uuid::new_v4();

    for _ in 0..5 {
        RateLimitRepo::check_and_increment(&pool, heavy, "sofia_chat", 100, 24)
            .await
            .unwrap();
    }
    RateLimitRepo::check_and_increment(&pool, light, "sofia_chat", 100, 24)
        .await
        .unwrap();
    RateLimitRepo::block(&pool, light, "medical_exam", 10, 24, 2)
        .await
        .unwrap();

    let totals = RateLimitRepo::totals(&pool).await.unwrap();
    assert_eq!(totals.total_tracked_pairs, 3);
    assert_eq!(totals.total_users, 2);
    assert_eq!(totals.blocked_count, 1);

    let by_op = RateLimitRepo::usage_by_operation(&pool).await.unwrap();
    let chat = by_op.iter().find(|u| u.operation == "sofia_chat").unwrap();
    assert_eq!(chat.tracked_pairs, 2);
    assert_eq!(chat.total_requests, 6);

    let top = RateLimitRepo::top_users(&pool, 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].user_id, heavy);
    assert_eq!(top[0].total_requests, 5);
}
