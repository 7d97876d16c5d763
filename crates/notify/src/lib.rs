//! Notification delivery domain: the persisted queue's producers and
//! consumer, and the outbound WhatsApp channel.
//!
//! - [`channel`] -- the outbound channel seam ([`NotificationChannel`]) and
//!   the explicit delivery policy ([`DeliveryMode`]).
//! - [`phone`] -- recipient address normalization.
//! - [`whatsapp`] -- the Whapi-style WhatsApp provider.
//! - [`templates`] -- title/body builders for the scheduled kinds.
//! - [`scheduler`] -- idempotent producers (morning briefing, weekly
//!   reports, re-engagement).
//! - [`processor`] -- the batch consumer that drains due notifications.

pub mod channel;
pub mod phone;
pub mod processor;
pub mod scheduler;
pub mod templates;
pub mod whatsapp;

pub use channel::{ChannelError, DeliveryMode, NotificationChannel};
pub use processor::{ProcessSummary, QueueProcessor, DEFAULT_BATCH_LIMIT};
pub use scheduler::{NotificationScheduler, ScheduleOutcome};
pub use whatsapp::{WhapiConfig, WhatsAppChannel};
