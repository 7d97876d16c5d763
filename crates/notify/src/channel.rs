//! Outbound channel seam and delivery policy.

use async_trait::async_trait;

/// Error type for outbound delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The recipient address could not be normalized.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Channel returned HTTP {0}")]
    HttpStatus(u16),
}

/// An outbound messaging channel.
///
/// The one contract the queue processor depends on; providers and test
/// doubles implement it.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Deliver `text` to the recipient's raw phone number. Implementations
    /// normalize the address themselves.
    async fn send_text(&self, phone: &str, text: &str) -> Result<(), ChannelError>;
}

/// What happens to a queue record when delivery fails.
///
/// `BestEffort` logs the failure and still accounts the record as
/// processed -- a channel outage degrades to "not actually delivered"
/// instead of an ever-growing unsent backlog. `Strict` leaves the record
/// unsent so the next processor run retries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    BestEffort,
    Strict,
}

impl DeliveryMode {
    /// Stable string form used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BestEffort => "best_effort",
            Self::Strict => "strict",
        }
    }

    /// Parse the stable string form. Returns `None` for unknown modes.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "best_effort" => Some(Self::BestEffort),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Load from the `DELIVERY_MODE` environment variable.
    ///
    /// An unset or unrecognized value falls back to `BestEffort`, the
    /// product's historical behavior.
    pub fn from_env() -> Self {
        std::env::var("DELIVERY_MODE")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(Self::BestEffort)
    }
}

impl Default for DeliveryMode {
    fn default() -> Self {
        Self::BestEffort
    }
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
