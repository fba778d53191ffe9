//! Newsdesk Core - Headless News Digest Engine
//!
//! This crate fetches news articles from RSS/Atom feeds, turns them into
//! prompts, and exchanges those prompts with a locally hosted text-generation
//! service. It has no UI dependencies: the `newsdesk` binary drives it from
//! the command line and from a small web surface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Surfaces                            │
//! │        ┌──────────────┐              ┌──────────────┐        │
//! │        │     CLI      │              │   Web (axum) │        │
//! │        └──────┬───────┘              └──────┬───────┘        │
//! │               └──────────────┬──────────────┘                │
//! └──────────────────────────────┼───────────────────────────────┘
//!                                │ DigestOptions
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                        NEWSDESK CORE                          │
//! │  ┌───────────────────────────┴──────────────────────────────┐ │
//! │  │                      Orchestrator                         │ │
//! │  │  ┌────────────┐   ┌────────────┐   ┌────────────────────┐ │ │
//! │  │  │   Feeds    │   │  Prompts   │   │ Generation Client  │ │ │
//! │  │  │ (TtlCache) │   │            │   │  (NDJSON stream)   │ │ │
//! │  │  └────────────┘   └────────────┘   └────────────────────┘ │ │
//! │  └──────────────────────────────────────────────────────────┘ │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use newsdesk_core::{GenerationClient, TextGenerator, load_config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let client = GenerationClient::new(config.generation.clone())?;
//!
//!     match client.generate("Say hello").await {
//!         Ok(text) => println!("{text}"),
//!         Err(e) => eprintln!("{e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`backend`]: generation client, fragment stream decoding and accumulation
//! - [`cache`]: time-boxed memo cache used for feed fetches
//! - [`config`]: layered configuration (defaults, TOML, environment, CLI)
//! - [`feeds`]: article model, feed parsing and fetching
//! - [`orchestrator`]: sequences feeds, prompts and generation for one run
//! - [`prompts`]: prompt styles and prompt composition

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod cache;
pub mod config;
pub mod feeds;
pub mod orchestrator;
pub mod prompts;

// Re-exports for convenience
pub use backend::{
    accumulate, decode_fragments, Fragment, GenerationClient, GenerationError,
    GenerationRequest, GenerationResult, TextGenerator,
};
pub use cache::TtlCache;
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, FeedConfig, GenerationConfig, NewsdeskConfig, NewsdeskToml, WebConfig,
};
pub use feeds::{parse_feed, Article, ArticleSource, FeedError, FeedFetcher};
pub use orchestrator::{DigestOptions, DigestReport, Orchestrator, OrchestratorError, Stage};
pub use prompts::{compose_prompt, follow_up_prompt, render_articles, PromptStyle};
