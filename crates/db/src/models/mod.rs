//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTOs its repository needs.

pub mod notification;
pub mod profile;
pub mod rate_limit;
