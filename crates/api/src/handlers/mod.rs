//! HTTP handler functions, grouped by resource.

pub mod notifications;
pub mod throttle;
