//! Text Generation Backend
//!
//! This module provides access to a locally hosted text-generation service
//! (Ollama's `/api/generate` by default) through a common trait interface.
//!
//! The exchange is split in two layers so each can be tested alone:
//!
//! - [`decode_fragments`] turns the raw response body into a lazy, finite
//!   stream of parsed [`Fragment`]s, one per NDJSON line.
//! - [`accumulate`] folds that stream into the final text.
//!
//! # Usage
//!
//! ```ignore
//! use newsdesk_core::backend::{GenerationClient, GenerationConfig, TextGenerator};
//!
//! let client = GenerationClient::new(GenerationConfig::default())?;
//! let text = client.generate("Summarize today's news").await?;
//! ```

mod client;
mod stream;
mod traits;

pub use crate::config::GenerationConfig;
pub use client::GenerationClient;
pub use stream::{accumulate, decode_fragments, Fragment};
pub use traits::{GenerationError, GenerationRequest, GenerationResult, TextGenerator};
