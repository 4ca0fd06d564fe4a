use async_trait::async_trait;
use serde_json::Value;

use skillgraph_application::AnalyticsSink;
use skillgraph_core::{AppError, AppResult};

/// Analytics sink posting capture events to a PostHog-compatible endpoint.
///
/// The audit trail treats every capture as fire-and-forget; this
/// implementation only reports transport and status failures so the caller
/// can log and discard them.
pub struct PosthogAnalyticsSink {
    http_client: reqwest::Client,
    api_key: String,
    capture_url: String,
}

impl PosthogAnalyticsSink {
    /// Creates a sink for the given project key and instance host.
    #[must_use]
    pub fn new(http_client: reqwest::Client, api_key: impl Into<String>, host: &str) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            capture_url: format!("{}/capture/", host.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl AnalyticsSink for PosthogAnalyticsSink {
    async fn capture(&self, distinct_id: &str, event: &str, properties: Value) -> AppResult<()> {
        let payload = serde_json::json!({
            "api_key": self.api_key,
            "event": event,
            "distinct_id": distinct_id,
            "properties": properties,
        });

        let response = self
            .http_client
            .post(self.capture_url.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("analytics capture transport error: {error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "analytics capture failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
