//! Text Generation Traits
//!
//! Trait and data definitions for text-generation backends. Orchestration
//! code talks to [`TextGenerator`] only, so tests and alternative services
//! can stand in for the HTTP client.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// One prompt for one model.
///
/// Serializes to exactly `{"model": ..., "prompt": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Model identifier understood by the service
    pub model: String,
    /// Prompt text
    pub prompt: String,
}

impl GenerationRequest {
    /// Create a new request for `model` with `prompt`
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// Failure of a single generation exchange
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service answered with a status other than 200
    #[error("{message}")]
    Service {
        /// HTTP status code returned by the service
        status: u16,
        /// Human-readable description embedding the status code
        message: String,
    },

    /// A line of the streamed body was not a valid fragment.
    ///
    /// The exchange is abandoned at the first bad line rather than skipping
    /// it, so callers never receive silently truncated text.
    #[error("Malformed fragment in generation stream: {source} (line: {line})")]
    StreamDecode {
        /// The offending line (lossily decoded)
        line: String,
        /// The underlying JSON error
        source: serde_json::Error,
    },

    /// Connection, DNS, timeout or body read failure
    #[error("Generation service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The prompt was empty or whitespace only
    #[error("Prompt must not be empty")]
    EmptyPrompt,
}

impl GenerationError {
    /// Build a service error for a non-success status
    #[must_use]
    pub fn service(status: u16) -> Self {
        Self::Service {
            status,
            message: format!("Received status code {status} from generation service"),
        }
    }

    /// Status code reported by the service, if the service answered at all
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the exchange was cut off by the configured timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Outcome of one exchange: the trimmed text, or why there is none
pub type GenerationResult = Result<String, GenerationError>;

/// Text generation backend
///
/// Implement this trait to plug a different service into the orchestrator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logs (e.g., "Ollama")
    fn name(&self) -> &str;

    /// Model used when the caller does not name one
    fn default_model(&self) -> &str;

    /// Perform one exchange for a fully specified request
    async fn send(&self, request: &GenerationRequest) -> GenerationResult;

    /// Generate text for `prompt` with the default model
    async fn generate(&self, prompt: &str) -> GenerationResult {
        let request = GenerationRequest::new(self.default_model(), prompt);
        self.send(&request).await
    }

    /// Generate text for `prompt` with an explicit model
    async fn generate_with_model(&self, prompt: &str, model: &str) -> GenerationResult {
        let request = GenerationRequest::new(model, prompt);
        self.send(&request).await
    }
}
