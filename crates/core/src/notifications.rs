//! Notification kind and priority enums.
//!
//! Kinds are stored as text in `notification_queue.kind` so new kinds can be
//! added without a migration; priorities are stored as their SMALLINT
//! ordinal because the queue is drained in `priority DESC` order and text
//! would not sort correctly.

use serde::{Deserialize, Serialize};

/// The kind of a queued notification.
///
/// The scheduled kinds (`MorningBriefing`, `WeeklyReport`, `ReEngagement`)
/// carry an at-most-one-pending-per-user guarantee enforced by the
/// scheduler. The remaining kinds are enqueued ad hoc by other subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MorningBriefing,
    WeeklyReport,
    ReEngagement,
    Achievement,
    WaterReminder,
    WeightReminder,
    MedicationReminder,
    HealthAlert,
    System,
}

impl NotificationKind {
    /// Stable string form stored in `notification_queue.kind`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MorningBriefing => "morning_briefing",
            Self::WeeklyReport => "weekly_report",
            Self::ReEngagement => "re_engagement",
            Self::Achievement => "achievement",
            Self::WaterReminder => "water_reminder",
            Self::WeightReminder => "weight_reminder",
            Self::MedicationReminder => "medication_reminder",
            Self::HealthAlert => "health_alert",
            Self::System => "system",
        }
    }

    /// Parse the stable string form. Returns `None` for unknown kinds.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "morning_briefing" => Some(Self::MorningBriefing),
            "weekly_report" => Some(Self::WeeklyReport),
            "re_engagement" => Some(Self::ReEngagement),
            "achievement" => Some(Self::Achievement),
            "water_reminder" => Some(Self::WaterReminder),
            "weight_reminder" => Some(Self::WeightReminder),
            "medication_reminder" => Some(Self::MedicationReminder),
            "health_alert" => Some(Self::HealthAlert),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery urgency. Higher ordinal drains first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl NotificationPriority {
    /// Ordinal stored in `notification_queue.priority`.
    pub fn as_i16(&self) -> i16 {
        *self as i16
    }

    /// Decode a stored ordinal. Out-of-range values collapse to `Medium`
    /// rather than failing a whole batch read.
    pub fn from_i16(v: i16) -> Self {
        match v {
            0 => Self::Low,
            2 => Self::High,
            3 => Self::Critical,
            _ => Self::Medium,
        }
    }
}
