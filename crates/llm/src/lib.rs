//! MailWorks generation provider infrastructure adapter.
//!
//! Implements [`pipeline::GenerationProvider`] over a JSON HTTP endpoint.
//! All transport, request formatting, response decoding, and exponential
//! back-off live here; the orchestration layer sees only the port trait and
//! a terminal [`pipeline::GenerationError`] once the retry budget is spent.
//!
//! ## Retry policy
//!
//! Bounded and scoped to transient failures: up to 5 attempts, exponential
//! back-off starting at 1 second with multiplier 7 (1 s, 7 s, 49 s, 343 s
//! between attempts), retried only on HTTP {429, 500, 503, 504} and request
//! timeouts. Everything else propagates immediately.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{GenerationError, GenerationProvider, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP status codes treated as transient.
const TRANSIENT_STATUS: [u16; 4] = [429, 500, 503, 504];

// ---------------------------------------------------------------------------
// Retry configuration
// ---------------------------------------------------------------------------

/// Bounded exponential back-off schedule for transient provider failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum total attempts (first call included).
    pub attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied per subsequent retry.
    pub exp_base: u32,
    /// HTTP status codes that are retried; all others propagate immediately.
    pub retry_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay: Duration::from_secs(1),
            exp_base: 7,
            retry_status: TRANSIENT_STATUS.to_vec(),
        }
    }
}

impl RetryConfig {
    /// The delay before retry number `retry` (1-based): `initial * base^(retry-1)`.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let factor = self.exp_base.saturating_pow(retry.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// A single failed call into the generation endpoint.
///
/// Classified into a [`RetryPolicy`] by the provider's retry loop; once the
/// budget is spent the final error converts into the terminal
/// [`GenerationError`] the port surfaces.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The endpoint answered with a non-success status.
    #[error("generation endpoint returned HTTP {status}")]
    Http {
        /// The response status code.
        status: u16,
    },

    /// The request timed out before a response arrived.
    #[error("generation request timed out")]
    Timeout,

    /// The request could not be carried at all (DNS, TLS, connection reset).
    #[error("generation transport failure: {detail}")]
    Transport {
        /// Transport error text.
        detail: String,
    },

    /// The endpoint answered 2xx but the body was not the expected shape.
    #[error("generation response was malformed: {detail}")]
    MalformedResponse {
        /// Decoder error text.
        detail: String,
    },
}

impl ProviderError {
    /// Classifies this failure under the configured schedule.
    ///
    /// Only listed status codes and timeouts are retryable; a malformed
    /// response or a hard transport failure never is.
    pub fn retry_policy(&self, config: &RetryConfig, next_retry: u32) -> RetryPolicy {
        match self {
            Self::Http { status } if config.retry_status.contains(status) => {
                RetryPolicy::Retryable {
                    after: Some(config.delay_before_retry(next_retry)),
                }
            }
            Self::Timeout => RetryPolicy::Retryable {
                after: Some(config.delay_before_retry(next_retry)),
            },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Transport {
                detail: err.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    content: String,
}

/// Interprets the endpoint's `content` field: strict-JSON replies decode into
/// structure, anything else stays a plain string value.
fn decode_content(content: &str) -> serde_json::Value {
    serde_json::from_str(content.trim())
        .unwrap_or_else(|_| serde_json::Value::String(content.to_string()))
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Configuration for an [`HttpGenerationProvider`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Endpoint accepting `{"prompt", "model"}` and answering `{"content"}`.
    pub endpoint: String,
    /// Model name forwarded with every request.
    pub model: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Back-off schedule for transient failures.
    pub retry: RetryConfig,
}

/// [`pipeline::GenerationProvider`] over a JSON HTTP endpoint with bounded
/// retry.
pub struct HttpGenerationProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpGenerationProvider {
    /// Builds a provider; fails only if the HTTP client cannot be constructed.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ProviderError::Transport {
                detail: err.to_string(),
            })?;
        Ok(Self { client, config })
    }

    async fn attempt(&self, prompt: &str) -> Result<serde_json::Value, ProviderError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&GenerateRequest {
                prompt,
                model: self.config.model.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse =
            response
                .json()
                .await
                .map_err(|err| ProviderError::MalformedResponse {
                    detail: err.to_string(),
                })?;
        Ok(decode_content(&body.content))
    }
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    async fn generate(&self, prompt: &str) -> Result<serde_json::Value, GenerationError> {
        let retry = &self.config.retry;
        let mut attempt = 1u32;
        loop {
            match self.attempt(prompt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let exhausted = attempt >= retry.attempts;
                    match err.retry_policy(retry, attempt) {
                        RetryPolicy::Retryable { after } if !exhausted => {
                            let delay = after.unwrap_or_default();
                            tracing::warn!(
                                attempt,
                                delay_secs = delay.as_secs(),
                                error = %err,
                                "transient generation failure; backing off"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        RetryPolicy::Retryable { .. } => {
                            return Err(GenerationError::new(format!(
                                "{err} (after {attempt} attempts)"
                            )));
                        }
                        RetryPolicy::NonRetryable => {
                            return Err(GenerationError::new(err.to_string()));
                        }
                    }
                }
            }
        }
    }
}
