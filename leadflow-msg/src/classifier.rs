//! Lead-status message classifier collaborator
//!
//! Classification itself happens in an external service; this module owns
//! the typed client and the write-back threshold. A classified status is only
//! acted on when its confidence clears the threshold.

use anyhow::{Context, Result};
use async_trait::async_trait;
use leadflow_common::db::LeadStatus;
use serde::{Deserialize, Serialize};

/// Default classification endpoint; overridable per deployment
pub const DEFAULT_CLASSIFIER_URL: &str = "https://api.deepseek.com/v1/lead-status";

/// A classified status below or at this confidence is never written back
pub const WRITEBACK_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Classifier output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub status: Option<LeadStatus>,
    pub confidence: f64,
    pub reasoning: Option<String>,
}

impl Classification {
    /// True when the classified status is confident enough to write back
    /// (strictly above the threshold)
    pub fn is_actionable(&self) -> bool {
        self.status.is_some() && self.confidence > WRITEBACK_CONFIDENCE_THRESHOLD
    }
}

/// Message text classifier
#[async_trait]
pub trait MessageClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

/// Production classifier: JSON POST to the configured endpoint
pub struct HttpClassifier {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            endpoint,
            api_key,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client (system error)"),
        }
    }
}

#[async_trait]
impl MessageClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        let mut request = self.client.post(&self.endpoint).json(&ClassifyRequest { text });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("Classifier request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Classifier returned HTTP {}", status);
        }

        let classification: Classification = response
            .json()
            .await
            .context("Unreadable classifier response")?;

        Ok(classification)
    }
}
