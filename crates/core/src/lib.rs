//! Shared domain types for the Vitalis control plane.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the admission guard, the notification services, and
//! the API server alike:
//!
//! - [`types`] -- database ID and timestamp aliases.
//! - [`error`] -- the domain-level error taxonomy.
//! - [`operations`] -- the enumerated rate-limited operations and their
//!   static per-operation limit configuration.
//! - [`notifications`] -- notification kind and priority enums.

pub mod error;
pub mod notifications;
pub mod operations;
pub mod types;

pub use error::CoreError;
pub use notifications::{NotificationKind, NotificationPriority};
pub use operations::{rate_limit_config, Operation, RateLimitConfig};
