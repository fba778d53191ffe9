//! Generation Client
//!
//! HTTP client for an Ollama-compatible `/api/generate` endpoint.
//!
//! # Exchange
//!
//! One POST per call with body `{"model": ..., "prompt": ...}`. The service
//! streams newline-delimited JSON; the body is read incrementally and every
//! fragment's `response` text is appended in arrival order. Any status other
//! than 200 is a failure and its body is not read.
//!
//! The whole exchange (connect, headers and body) is bounded by the
//! configured timeout. The response is owned by the call and dropped on every
//! exit path, and the underlying client keeps no idle connections around.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use super::stream::{accumulate, decode_fragments};
use super::traits::{GenerationError, GenerationRequest, GenerationResult, TextGenerator};
use crate::config::GenerationConfig;

/// Client for a streaming text-generation service
#[derive(Clone, Debug)]
pub struct GenerationClient {
    /// Endpoint and model settings
    config: GenerationConfig,
    /// HTTP client
    http_client: reqwest::Client,
}

impl GenerationClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Transport`] if the HTTP client cannot be
    /// built (e.g. the TLS backend fails to initialize).
    pub fn new(config: GenerationConfig) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Endpoint this client posts to
    #[must_use]
    pub fn service_url(&self) -> &str {
        &self.config.service_url
    }

    /// Configuration this client was built from
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    fn name(&self) -> &'static str {
        "Ollama"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    async fn send(&self, request: &GenerationRequest) -> GenerationResult {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        let start = Instant::now();
        debug!(
            url = %self.config.service_url,
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            "Sending generation request"
        );

        let response = self
            .http_client
            .post(&self.config.service_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %self.config.service_url, "Generation service unreachable");
                GenerationError::from(e)
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let err = GenerationError::service(status.as_u16());
            error!(status = status.as_u16(), model = %request.model, "{err}");
            return Err(err);
        }

        let text = accumulate(decode_fragments(response.bytes_stream()))
            .await
            .inspect_err(|e| {
                warn!(error = %e, model = %request.model, "Generation stream failed");
            })?;

        info!(
            model = %request.model,
            chars = text.chars().count(),
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Generation complete"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = GenerationClient::new(GenerationConfig::default()).unwrap();

        assert_eq!(client.service_url(), "http://localhost:11434/api/generate");
        assert_eq!(client.default_model(), "llama3.2");
        assert_eq!(client.name(), "Ollama");
    }

    #[test]
    fn test_client_keeps_configuration() {
        let config = GenerationConfig {
            service_url: "http://gpu-box:8080/api/generate".to_string(),
            default_model: "mistral".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(1),
        };

        let client = GenerationClient::new(config.clone()).unwrap();
        assert_eq!(client.config(), &config);
        assert_eq!(client.default_model(), "mistral");
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_before_io() {
        // Nothing listens on this port; an attempted connection would fail
        // with a transport error instead.
        let config = GenerationConfig {
            service_url: "http://127.0.0.1:9/api/generate".to_string(),
            ..GenerationConfig::default()
        };
        let client = GenerationClient::new(config).unwrap();

        let result = client.generate("   \n").await;
        assert!(matches!(result, Err(GenerationError::EmptyPrompt)));
    }
}
