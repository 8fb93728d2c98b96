//! Best-effort search-engine indexing pings.
//!
//! A publish notifies the configured search-indexing endpoint that a URL
//! changed. Failures are logged at warn level and never propagated: a
//! bounced ping must not fail, revert, or retry the publish that
//! triggered it.

use std::time::Duration;

/// Ping timeout.
const PING_TIMEOUT_SECS: u64 = 5;

/// Fire-and-forget notifier for the search-indexing collaborator.
pub struct IndexingNotifier {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl IndexingNotifier {
    /// Build a notifier. `endpoint` is the ping URL; `None` disables
    /// notification entirely (local development).
    pub fn new(endpoint: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(PING_TIMEOUT_SECS))
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self { http, endpoint }
    }

    /// Load from the `SEARCH_PING_ENDPOINT` env var.
    pub fn from_env() -> Self {
        Self::new(std::env::var("SEARCH_PING_ENDPOINT").ok())
    }

    /// Notify the search engine that `url` changed.
    pub async fn notify(&self, url: &str) {
        let Some(endpoint) = &self.endpoint else {
            tracing::debug!(url, "Indexing ping skipped: no endpoint configured");
            return;
        };

        let result = self
            .http
            .get(endpoint)
            .query(&[("url", url)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(url, "Indexing ping delivered");
            }
            Ok(response) => {
                tracing::warn!(url, status = %response.status(), "Indexing ping rejected");
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "Indexing ping failed");
            }
        }
    }
}
