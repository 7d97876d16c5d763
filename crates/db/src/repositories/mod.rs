//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod notification_repo;
pub mod profile_repo;
pub mod rate_limit_repo;

pub use activity_repo::ActivityRepo;
pub use notification_repo::NotificationRepo;
pub use profile_repo::ProfileRepo;
pub use rate_limit_repo::RateLimitRepo;
