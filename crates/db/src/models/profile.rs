//! Profile entity model (Profile-Lookup / Activity-Signal collaborators).

use serde::Serialize;
use sqlx::FromRow;
use vitalis_core::types::{Timestamp, UserId};

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub streak_days: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
