//! Shared HTTP transport for the hosted classifiers.
//!
//! Adds the bearer credential, enforces the per-request timeout, and retries
//! a bounded number of times while the remote model is warming up.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use pantry_core::{Error, Result};

use crate::config::ClassifierConfig;

/// Longest error body excerpt carried into an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// Whether a response signals a model that is still loading.
///
/// Hosted inference endpoints answer 503 with an `estimated_time` field or a
/// "loading" message until the model is ready.
pub fn is_warming_up(status: StatusCode, body: &str) -> bool {
    if status != StatusCode::SERVICE_UNAVAILABLE {
        return false;
    }
    let lower = body.to_lowercase();
    lower.contains("loading") || lower.contains("estimated_time")
}

/// POSTs JSON to a classifier endpoint.
pub(crate) struct ClassifierHttp {
    client: Client,
    base_url: String,
    token: Option<String>,
    warmup_retries: u32,
    warmup_backoff: Duration,
}

impl ClassifierHttp {
    pub(crate) fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
            warmup_retries: config.warmup_retries,
            warmup_backoff: config.warmup_backoff,
        })
    }

    pub(crate) fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref token) = self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        req.header("Content-Type", "application/json")
    }

    /// Send `body` to `endpoint` and decode the JSON answer.
    ///
    /// Non-success statuses become [`Error::Classifier`], transport failures
    /// [`Error::Request`], undecodable bodies [`Error::Serialization`].
    pub(crate) async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut attempt: u32 = 0;
        loop {
            let response = self.build_request(endpoint).json(body).send().await?;
            let status = response.status();
            let text = response.text().await?;

            if status.is_success() {
                return serde_json::from_str(&text).map_err(|e| {
                    Error::Serialization(format!("Unexpected response from {}: {}", endpoint, e))
                });
            }

            if is_warming_up(status, &text) && attempt < self.warmup_retries {
                attempt += 1;
                debug!(
                    endpoint,
                    attempt,
                    max_retries = self.warmup_retries,
                    backoff_ms = self.warmup_backoff.as_millis() as u64,
                    "Classifier model warming up, retrying"
                );
                tokio::time::sleep(self.warmup_backoff).await;
                continue;
            }

            if is_warming_up(status, &text) {
                warn!(endpoint, attempts = attempt + 1, "Classifier model still warming up");
            }
            return Err(Error::Classifier(format!(
                "{} returned {}: {}",
                endpoint,
                status,
                excerpt(&text)
            )));
        }
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
