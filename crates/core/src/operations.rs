//! Rate-limited operations and their per-operation limit configuration.
//!
//! Every admission decision is keyed by `(user, operation)`. The operation
//! set is a closed enum validated at the API boundary; unknown strings are a
//! validation failure, not a throttling decision. Limits live in a static
//! table with a required default entry so adding a new operation never
//! leaves it unconfigured.

use serde::{Deserialize, Serialize};

/// An operation subject to admission control.
///
/// Serialized as snake_case text both on the wire and in the
/// `rate_limits.operation` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Sofia nutrition-assistant chat turns.
    SofiaChat,
    /// Dr. Vital health-assistant chat turns.
    DrVitalChat,
    /// Food photo analysis.
    FoodAnalysis,
    /// General AI analysis requests.
    AiAnalysis,
    /// Medical document / exam processing.
    MedicalExam,
    /// PDF report generation.
    ReportGeneration,
    /// Outbound WhatsApp messages triggered by the user.
    WhatsappMessage,
}

impl Operation {
    /// Stable string form used in the database and in API messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SofiaChat => "sofia_chat",
            Self::DrVitalChat => "dr_vital_chat",
            Self::FoodAnalysis => "food_analysis",
            Self::AiAnalysis => "ai_analysis",
            Self::MedicalExam => "medical_exam",
            Self::ReportGeneration => "report_generation",
            Self::WhatsappMessage => "whatsapp_message",
        }
    }

    /// Parse the stable string form. Returns `None` for unknown operations.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sofia_chat" => Some(Self::SofiaChat),
            "dr_vital_chat" => Some(Self::DrVitalChat),
            "food_analysis" => Some(Self::FoodAnalysis),
            "ai_analysis" => Some(Self::AiAnalysis),
            "medical_exam" => Some(Self::MedicalExam),
            "report_generation" => Some(Self::ReportGeneration),
            "whatsapp_message" => Some(Self::WhatsappMessage),
            _ => None,
        }
    }

    /// All operations, in config-table order. Used by the stats endpoint to
    /// echo the configuration back to operators.
    pub fn all() -> &'static [Operation] {
        &[
            Self::SofiaChat,
            Self::DrVitalChat,
            Self::FoodAnalysis,
            Self::AiAnalysis,
            Self::MedicalExam,
            Self::ReportGeneration,
            Self::WhatsappMessage,
        ]
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Limit configuration for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitConfig {
    /// Maximum requests allowed inside one window.
    pub max_requests: i32,
    /// Window length in hours.
    pub window_hours: i32,
}

/// Fallback configuration for operations without a dedicated entry.
pub const DEFAULT_RATE_LIMIT: RateLimitConfig = RateLimitConfig {
    max_requests: 60,
    window_hours: 24,
};

/// Static limit table.
///
/// Chat operations are deliberately looser than medical-document
/// operations: a chat turn is cheap, a medical exam analysis is not.
pub fn rate_limit_config(operation: Operation) -> RateLimitConfig {
    match operation {
        Operation::SofiaChat | Operation::DrVitalChat => RateLimitConfig {
            max_requests: 100,
            window_hours: 24,
        },
        Operation::FoodAnalysis => RateLimitConfig {
            max_requests: 80,
            window_hours: 24,
        },
        Operation::AiAnalysis => RateLimitConfig {
            max_requests: 50,
            window_hours: 24,
        },
        Operation::MedicalExam => RateLimitConfig {
            max_requests: 10,
            window_hours: 24,
        },
        Operation::ReportGeneration => RateLimitConfig {
            max_requests: 20,
            window_hours: 24,
        },
        // Everything else falls through to the default entry.
        _ => DEFAULT_RATE_LIMIT,
    }
}
