//! Admission control for rate-limited operations.
//!
//! [`RateLimitGuard`] is the one interface the rest of the product calls
//! before performing a rate-limited operation. It owns the fail-open
//! policy: an unreachable or failing store must never turn into a denied
//! product request.

pub mod guard;

pub use guard::{CheckDecision, GuardStats, OperationConfig, RateLimitGuard};
