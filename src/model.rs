//! Model client abstraction and the OpenAI implementation.
//!
//! The analysis pipeline treats the language model as an opaque string
//! producer behind the [`ModelClient`] trait. The client owns transport
//! policy — timeouts, retry on rate limits, backoff — while the pipeline
//! owns recovery: any [`ModelError`] a call returns is absorbed into a
//! fallback document, never re-raised to the caller.
//!
//! The one exception is credentials: [`OpenAiClient::new`] fails immediately
//! when the API key is missing. That is an operator error and the only error
//! the analysis core lets escape.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::config::ModelConfig;

/// Transport and configuration failures from a model call.
#[derive(Debug)]
pub enum ModelError {
    MissingCredentials(String),
    RateLimited(String),
    Unauthorized(String),
    Timeout(String),
    Http(String),
    EmptyResponse,
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::MissingCredentials(e) => write!(f, "missing credentials: {}", e),
            ModelError::RateLimited(e) => write!(f, "rate limited: {}", e),
            ModelError::Unauthorized(e) => write!(f, "unauthorized: {}", e),
            ModelError::Timeout(e) => write!(f, "request timed out: {}", e),
            ModelError::Http(e) => write!(f, "model request failed: {}", e),
            ModelError::EmptyResponse => write!(f, "model returned an empty response"),
        }
    }
}

impl std::error::Error for ModelError {}

/// An opaque producer of model response text.
///
/// Implementations own their transport policy (timeouts, retries). The
/// pipeline awaits one call per analysis and treats any error as a routine
/// condition to degrade from, so implementations should not panic.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send a prompt and return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Model client backed by the OpenAI chat completions API.
///
/// Requires the `OPENAI_API_KEY` environment variable; checked once at
/// construction, before any request is attempted.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    max_retries: u32,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::MissingCredentials`] if `OPENAI_API_KEY` is not
    /// set. This is the configuration precondition the analysis core
    /// propagates instead of absorbing.
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ModelError::MissingCredentials("OPENAI_API_KEY environment variable not set".into())
        })?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            max_retries: config.max_retries,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| ModelError::Http(e.to_string()))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.0,
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post("https://api.openai.com/v1/chat/completions")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| ModelError::Http(e.to_string()))?;
                        return extract_message_text(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        warn!(status = %status, attempt, "model call failed, will retry");
                        last_err = Some(ModelError::RateLimited(format!(
                            "OpenAI API error {}: {}",
                            status, body_text
                        )));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    if status.as_u16() == 401 || status.as_u16() == 403 {
                        return Err(ModelError::Unauthorized(format!(
                            "OpenAI API error {}: {}",
                            status, body_text
                        )));
                    }

                    // Client error (not 429) — don't retry
                    return Err(ModelError::Http(format!(
                        "OpenAI API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) if e.is_timeout() => {
                    last_err = Some(ModelError::Timeout(e.to_string()));
                    continue;
                }
                Err(e) => {
                    last_err = Some(ModelError::Http(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| ModelError::Http("model call failed after retries".to_string())))
    }
}

/// Pull the first choice's message content out of a chat completions
/// response.
fn extract_message_text(json: &serde_json::Value) -> Result<String, ModelError> {
    let text = json
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .unwrap_or("");

    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_choice_content() {
        let json = serde_json::json!({
            "choices": [{ "message": { "content": "{\"property\": {}}" } }]
        });
        assert_eq!(extract_message_text(&json).unwrap(), "{\"property\": {}}");
    }

    #[test]
    fn empty_content_is_an_error() {
        let json = serde_json::json!({
            "choices": [{ "message": { "content": "   " } }]
        });
        assert!(matches!(
            extract_message_text(&json),
            Err(ModelError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_response_is_an_error() {
        let json = serde_json::json!({ "error": { "message": "boom" } });
        assert!(matches!(
            extract_message_text(&json),
            Err(ModelError::EmptyResponse)
        ));
    }
}
