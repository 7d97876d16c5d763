//! Repository for the `profiles` table (Profile-Lookup collaborator).

use sqlx::PgPool;
use vitalis_core::types::UserId;

use crate::models::profile::Profile;

/// Column list for `profiles` queries.
const COLUMNS: &str = "user_id, full_name, phone, streak_days, created_at, updated_at";

/// Provides lookups against user profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Fetch one profile, if it exists.
    pub async fn find(pool: &PgPool, user_id: UserId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Profiles with a positive streak signal, i.e. "active" users for the
    /// weekly-report scheduler.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles WHERE streak_days > 0 ORDER BY user_id"
        );
        sqlx::query_as::<_, Profile>(&query).fetch_all(pool).await
    }
}
