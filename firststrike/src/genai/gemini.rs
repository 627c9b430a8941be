//! Gemini API client implementation
//!
//! Implements the GenAiClient trait against the `generateContent` endpoint
//! with bounded retries for transient failures.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{GenAiClient, GenAiError, GenerateRequest, GenerateResponse};
use crate::config::GenAiConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Retry-after used when a 429 carries no usable hint
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Check if an HTTP status code is retryable
///
/// 429 is handled separately: quota exhaustion is surfaced, not retried.
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 500 | 502 | 503 | 504)
}

/// Pull a retry delay out of a Google RPC error body
///
/// Looks for `error.details[*].retryDelay` in the "17s" form.
fn parse_retry_delay(body: &str) -> Option<Duration> {
    debug!(body_len = body.len(), "parse_retry_delay: called");
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value["error"]["details"]
        .as_array()?
        .iter()
        .filter_map(|detail| detail["retryDelay"].as_str())
        .find_map(|delay| delay.strip_suffix('s')?.parse::<f64>().ok())
        .map(|secs| Duration::from_secs_f64(secs.max(0.0)))
}

/// Gemini generative AI client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &GenAiConfig) -> Result<Self, GenAiError> {
        debug!(?config, "from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|_| GenAiError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(api_key, config.base_url.clone(), Duration::from_millis(config.timeout_ms))
    }

    /// Create a client with an explicit key
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self, GenAiError> {
        let http = Client::builder().timeout(timeout).build().map_err(GenAiError::Network)?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Endpoint URL for a model
    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenAiClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GenAiError> {
        debug!(model = %request.model, tools = request.tools.len(), "generate: called");
        let url = self.endpoint(&request.model);
        let body = serde_json::to_value(&request)?;

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .header("x-goog-api-key", self.api_key.clone())
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate: network error");
                    last_error = Some(GenAiError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                debug!("generate: rate limited (429)");
                let header_hint = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                let message = response.text().await.unwrap_or_default();
                let retry_after = header_hint
                    .or_else(|| parse_retry_delay(&message))
                    .unwrap_or(Duration::from_secs(DEFAULT_RETRY_AFTER_SECS));

                return Err(GenAiError::RateLimited { retry_after, message });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "generate: retryable error");
                last_error = Some(GenAiError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                debug!(%status, "generate: API error");
                let text = response.text().await.unwrap_or_default();
                return Err(GenAiError::ApiError { status, message: text });
            }

            debug!("generate: success");
            let api_response: GenerateResponse = response.json().await?;
            return Ok(api_response);
        }

        Err(last_error.unwrap_or_else(|| GenAiError::InvalidResponse("Max retries exceeded".to_string())))
    }
}
