//! SMS transport collaborator
//!
//! The gateway is an external HTTP service; this module owns the typed
//! client. Sending is never retried here; a failure surfaces to the caller
//! and the message is stored as failed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use leadflow_common::db::UserMessagingSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default SMS gateway endpoint; overridable per deployment
pub const DEFAULT_GATEWAY_URL: &str = "https://api.smrtphone.io/v1/messages";

/// Outcome reported by the SMS gateway
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// Outbound message sender
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Send one SMS using the sender's gateway credentials
    async fn send(
        &self,
        settings: &UserMessagingSettings,
        to: &str,
        message: &str,
    ) -> Result<DeliveryOutcome>;
}

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    message: &'a str,
}

/// Production transport: JSON POST to the configured gateway
pub struct HttpSmsTransport {
    gateway_url: String,
    client: reqwest::Client,
}

impl HttpSmsTransport {
    pub fn new(gateway_url: String) -> Self {
        Self {
            gateway_url,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client (system error)"),
        }
    }
}

#[async_trait]
impl SmsTransport for HttpSmsTransport {
    async fn send(
        &self,
        settings: &UserMessagingSettings,
        to: &str,
        message: &str,
    ) -> Result<DeliveryOutcome> {
        let api_key = settings
            .gateway_api_key
            .as_deref()
            .context("Gateway API key not configured")?;

        let request = GatewayRequest {
            to,
            from: settings.outbound_number(),
            message,
        };

        debug!(to, "Dispatching SMS to gateway");

        let response = self
            .client
            .post(&self.gateway_url)
            .header("X-Api-Key", api_key)
            .json(&request)
            .send()
            .await
            .context("Gateway request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Gateway returned HTTP {}", status);
        }

        let outcome: DeliveryOutcome = response
            .json()
            .await
            .context("Unreadable gateway response")?;

        Ok(outcome)
    }
}
