//! HTTP client for the remote product-pricing API.
//!
//! Wraps `reqwest` with the API's token handling, typed response
//! deserialization, and the pacing/retry policy in [`crate::retry`]. Every
//! request is preceded by the configured inter-call delay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::PricingError;
use crate::retry::{classify_status, retry_with_backoff, RetryPolicy, StatusClass};
use crate::types::{RemoteProduct, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://www.pricecharting.com/api";

/// Construction settings for [`PricingClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Total attempts per call, including the first.
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
    pub inter_call_delay: Duration,
}

/// Client for the pricing API's `products` search and `product` lookup.
///
/// Use [`PricingClient::new`] for production or
/// [`PricingClient::with_base_url`] to point at a mock server in tests.
pub struct PricingClient {
    client: Client,
    token: String,
    base_url: Url,
    policy: RetryPolicy,
    retries: Arc<AtomicU64>,
}

impl PricingClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, options: &ClientOptions) -> Result<Self, PricingError> {
        Self::with_base_url(token, DEFAULT_BASE_URL, options)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`PricingError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        token: &str,
        base_url: &str,
        options: &ClientOptions,
    ) -> Result<Self, PricingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent.as_str())
            .build()?;

        // A trailing slash makes `Url::join` append endpoints instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| PricingError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
            policy: RetryPolicy {
                max_attempts: options.max_attempts,
                backoff_base_secs: options.backoff_base_secs,
                inter_call_delay: options.inter_call_delay,
            },
            retries: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Total retries performed by this client since construction.
    #[must_use]
    pub fn retry_count(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Searches products by free text. Results keep the API's order.
    ///
    /// # Errors
    ///
    /// - [`PricingError::Transient`] once all attempts returned 429/5xx.
    /// - [`PricingError::UnexpectedStatus`] on any other non-2xx (not retried).
    /// - [`PricingError::Api`] when the body reports `"status": "error"`.
    /// - [`PricingError::Deserialize`] if the body does not match the expected shape.
    /// - [`PricingError::Http`] on network failure after all attempts.
    pub async fn search(&self, query: &str) -> Result<Vec<RemoteProduct>, PricingError> {
        let url = self.build_url("products", &[("q", query)])?;
        let body = self.get_json(&url).await?;
        let envelope: SearchResponse =
            serde_json::from_value(body).map_err(|e| PricingError::Deserialize {
                context: format!("products(q={query})"),
                source: e,
            })?;
        Ok(envelope.products)
    }

    /// Looks up one product by its remote identifier.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search`].
    pub async fn fetch_by_id(&self, remote_id: &str) -> Result<RemoteProduct, PricingError> {
        let url = self.build_url("product", &[("id", remote_id)])?;
        let body = self.get_json(&url).await?;
        serde_json::from_value(body).map_err(|e| PricingError::Deserialize {
            context: format!("product(id={remote_id})"),
            source: e,
        })
    }

    /// Builds `{base}/{endpoint}?{extra}&t={token}` with percent-encoded values.
    fn build_url(&self, endpoint: &str, extra: &[(&str, &str)]) -> Result<Url, PricingError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| PricingError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("t", &self.token);
        }
        Ok(url)
    }

    /// Sends a paced, retried GET and returns the JSON body.
    ///
    /// Errors carry only the URL path, and transport errors have their URL
    /// stripped, so the token never reaches logs.
    async fn get_json(&self, url: &Url) -> Result<serde_json::Value, PricingError> {
        let endpoint = url.path().to_owned();
        retry_with_backoff(self.policy, &self.retries, || {
            let url = url.clone();
            let endpoint = endpoint.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| PricingError::Http(e.without_url()))?;
                let status = response.status();
                match classify_status(status) {
                    StatusClass::Success => {}
                    StatusClass::Retryable => {
                        return Err(PricingError::Transient {
                            status: status.as_u16(),
                            endpoint,
                        });
                    }
                    StatusClass::Permanent => {
                        return Err(PricingError::UnexpectedStatus {
                            status: status.as_u16(),
                            endpoint,
                        });
                    }
                }

                let text = response
                    .text()
                    .await
                    .map_err(|e| PricingError::Http(e.without_url()))?;
                let body: serde_json::Value =
                    serde_json::from_str(&text).map_err(|e| PricingError::Deserialize {
                        context: endpoint.clone(),
                        source: e,
                    })?;
                Self::check_api_error(&body)?;
                Ok(body)
            }
        })
        .await
    }

    /// Surfaces `{"status": "error", "error-message": ...}` bodies as errors.
    fn check_api_error(body: &serde_json::Value) -> Result<(), PricingError> {
        if body.get("status").and_then(serde_json::Value::as_str) == Some("error") {
            let msg = body
                .get("error-message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(PricingError::Api(msg));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
