//! WhatsApp delivery via a Whapi-style HTTP provider.
//!
//! [`WhatsAppChannel`] posts plain-text messages to the provider's
//! `/messages/text` endpoint. Configuration is loaded from environment
//! variables; if `WHAPI_API_URL` or `WHAPI_TOKEN` is not set,
//! [`WhapiConfig::from_env`] returns `None` and no channel should be
//! constructed -- the processor then accounts records without delivering.

use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{ChannelError, NotificationChannel};
use crate::phone;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the WhatsApp provider.
#[derive(Debug, Clone)]
pub struct WhapiConfig {
    /// Provider API base URL.
    pub api_url: String,
    /// Bearer token.
    pub api_token: String,
    /// Optional channel (sender line) identifier.
    pub channel_id: Option<String>,
}

impl WhapiConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `WHAPI_API_URL` or `WHAPI_TOKEN` is not set,
    /// signalling that outbound WhatsApp delivery is not configured.
    ///
    /// | Variable           | Required |
    /// |--------------------|----------|
    /// | `WHAPI_API_URL`    | yes      |
    /// | `WHAPI_TOKEN`      | yes      |
    /// | `WHAPI_CHANNEL_ID` | no       |
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("WHAPI_API_URL").ok()?;
        let api_token = std::env::var("WHAPI_TOKEN").ok()?;
        Some(Self {
            api_url,
            api_token,
            channel_id: std::env::var("WHAPI_CHANNEL_ID").ok(),
        })
    }
}

/// Sends text messages through the WhatsApp provider.
pub struct WhatsAppChannel {
    config: WhapiConfig,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    /// Create a new channel with a pre-configured HTTP client.
    pub fn new(config: WhapiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl NotificationChannel for WhatsAppChannel {
    async fn send_text(&self, phone: &str, text: &str) -> Result<(), ChannelError> {
        let to = phone::normalize(phone)
            .ok_or_else(|| ChannelError::InvalidPhone(phone.to_string()))?;

        let url = format!("{}/messages/text", self.config.api_url.trim_end_matches('/'));
        let payload = serde_json::json!({ "to": to, "body": text });

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_token)
            .json(&payload);
        if let Some(channel_id) = &self.config.channel_id {
            request = request.header("X-Channel-Id", channel_id);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ChannelError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = %to, "WhatsApp message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_provider_credentials() {
        std::env::remove_var("WHAPI_API_URL");
        std::env::remove_var("WHAPI_TOKEN");
        assert!(WhapiConfig::from_env().is_none());
    }

    #[tokio::test]
    async fn unparseable_phone_fails_before_any_request() {
        let channel = WhatsAppChannel::new(WhapiConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            api_token: "token".to_string(),
            channel_id: None,
        });

        let err = channel.send_text("12", "hello").await.unwrap_err();
        assert!(matches!(err, ChannelError::InvalidPhone(_)));
    }
}
