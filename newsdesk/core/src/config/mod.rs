//! TOML Configuration File Support
//!
//! This module provides centralized configuration loading for newsdesk,
//! supporting a TOML configuration file at `~/.config/newsdesk/newsdesk.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/newsdesk/newsdesk.toml` (typically `~/.config/newsdesk/newsdesk.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [generation]
//! service_url = "http://localhost:11434/api/generate"
//! default_model = "llama3.2"
//! timeout_secs = 120
//! connect_timeout_secs = 10
//!
//! [feeds]
//! article_count = 3
//! cache_ttl_secs = 300
//! fetch_timeout_secs = 15
//!
//! [feeds.categories]
//! rust = ["https://blog.rust-lang.org/feed.xml"]
//!
//! [web]
//! host = "127.0.0.1"
//! port = 5000
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Generation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationToml {
    /// Full URL of the generate endpoint
    pub service_url: Option<String>,

    /// Model used when a request does not name one
    pub default_model: Option<String>,

    /// Whole-exchange timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: Option<u64>,
}

/// Feeds section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedsToml {
    /// Articles taken from each feed
    pub article_count: Option<usize>,

    /// Lifetime of memoized feed results in seconds (0 disables)
    pub cache_ttl_secs: Option<u64>,

    /// Per-feed download timeout in seconds
    pub fetch_timeout_secs: Option<u64>,

    /// Category name to feed URLs; entries replace defaults of the same name
    pub categories: BTreeMap<String, Vec<String>>,
}

/// Web section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebToml {
    /// Bind address
    pub host: Option<String>,

    /// Bind port
    pub port: Option<u16>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsdeskToml {
    /// Generation service section
    pub generation: GenerationToml,

    /// Feeds section
    pub feeds: FeedsToml,

    /// Web surface section
    pub web: WebToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Default endpoint of a local Ollama instance
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:11434/api/generate";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Generation client settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Full URL of the generate endpoint
    pub service_url: String,
    /// Model used when a request does not name one
    pub default_model: String,
    /// Bound on the whole exchange, body included
    pub timeout: Duration,
    /// Bound on establishing the connection
    pub connect_timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Feed fetching settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedConfig {
    /// Articles taken from each feed
    pub article_count: usize,
    /// Lifetime of memoized feed results
    pub cache_ttl: Duration,
    /// Per-feed download timeout
    pub fetch_timeout: Duration,
    /// Category name to feed URLs
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            article_count: 3,
            cache_ttl: Duration::from_secs(300),
            fetch_timeout: Duration::from_secs(15),
            categories: default_categories(),
        }
    }
}

/// Built-in feed categories
#[must_use]
pub fn default_categories() -> BTreeMap<String, Vec<String>> {
    let cybersecurity = [
        "https://news.ycombinator.com/rss",
        "https://www.infosecurity-magazine.com/rss/news/",
        "https://krebsonsecurity.com/feed/",
        "https://nakedsecurity.sophos.com/feed/",
        "https://www.schneier.com/blog/index.rdf",
        "https://threatpost.com/feed/",
    ];
    let general = [
        "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml",
        "https://feeds.bbci.co.uk/news/rss.xml",
        "https://www.theguardian.com/world/rss",
    ];

    let mut categories = BTreeMap::new();
    categories.insert(
        "cybersecurity".to_string(),
        cybersecurity.iter().map(ToString::to_string).collect(),
    );
    categories.insert(
        "general".to_string(),
        general.iter().map(ToString::to_string).collect(),
    );
    categories
}

/// Web surface settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Centralized configuration for newsdesk
///
/// This struct consolidates all configuration from multiple sources and tracks
/// where the last applied value came from. Use [`load_config`] to load
/// configuration with proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct NewsdeskConfig {
    /// Generation client settings
    pub generation: GenerationConfig,

    /// Feed settings
    pub feeds: FeedConfig,

    /// Web surface settings
    pub web: WebConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl NewsdeskConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values that would make the program misbehave
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.generation.service_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "service_url {:?} is not a valid URL: {e}",
                self.generation.service_url
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "service_url must use http or https, got {:?}",
                url.scheme()
            )));
        }
        if self.generation.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model must not be empty".to_string(),
            ));
        }
        if self.generation.timeout.is_zero() || self.generation.connect_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "generation timeouts must be greater than zero".to_string(),
            ));
        }
        if self.feeds.article_count == 0 {
            return Err(ConfigError::ValidationError(
                "article_count must be at least 1".to_string(),
            ));
        }
        if self.feeds.fetch_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/newsdesk/newsdesk.toml` or
/// `~/.config/newsdesk/newsdesk.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("newsdesk").join("newsdesk.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<NewsdeskConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<NewsdeskConfig, ConfigError> {
    let mut config = load_file_layer(path)?;
    apply_env_config(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Defaults plus the TOML file, without environment overrides
fn load_file_layer(path: Option<PathBuf>) -> Result<NewsdeskConfig, ConfigError> {
    let mut config = NewsdeskConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: NewsdeskToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut NewsdeskConfig, toml: &NewsdeskToml) {
    // Generation settings
    if let Some(ref url) = toml.generation.service_url {
        config.generation.service_url.clone_from(url);
    }
    if let Some(ref model) = toml.generation.default_model {
        config.generation.default_model.clone_from(model);
    }
    if let Some(secs) = toml.generation.timeout_secs {
        config.generation.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = toml.generation.connect_timeout_secs {
        config.generation.connect_timeout = Duration::from_secs(secs);
    }

    // Feed settings
    if let Some(count) = toml.feeds.article_count {
        config.feeds.article_count = count;
    }
    if let Some(secs) = toml.feeds.cache_ttl_secs {
        config.feeds.cache_ttl = Duration::from_secs(secs);
    }
    if let Some(secs) = toml.feeds.fetch_timeout_secs {
        config.feeds.fetch_timeout = Duration::from_secs(secs);
    }
    for (name, urls) in &toml.feeds.categories {
        config.feeds.categories.insert(name.clone(), urls.clone());
    }

    // Web settings
    if let Some(ref host) = toml.web.host {
        config.web.host.clone_from(host);
    }
    if let Some(port) = toml.web.port {
        config.web.port = port;
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Option<T> {
    let parsed = value.trim().parse::<T>().ok();
    if parsed.is_none() {
        tracing::warn!(key, value, "Ignoring unparseable environment value");
    }
    parsed
}

/// Apply environment variable overrides to the config
///
/// `lookup` resolves a variable name to its value; production code passes
/// `std::env::var`.
fn apply_env_config<F>(config: &mut NewsdeskConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("NEWSDESK_SERVICE_URL") {
        config.generation.service_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = lookup("NEWSDESK_DEFAULT_MODEL") {
        config.generation.default_model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(value) = lookup("NEWSDESK_TIMEOUT_SECS") {
        if let Some(secs) = parse_env::<u64>("NEWSDESK_TIMEOUT_SECS", &value) {
            config.generation.timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(value) = lookup("NEWSDESK_ARTICLE_COUNT") {
        if let Some(count) = parse_env::<usize>("NEWSDESK_ARTICLE_COUNT", &value) {
            config.feeds.article_count = count;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(value) = lookup("NEWSDESK_CACHE_TTL_SECS") {
        if let Some(secs) = parse_env::<u64>("NEWSDESK_CACHE_TTL_SECS", &value) {
            config.feeds.cache_ttl = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(host) = lookup("NEWSDESK_WEB_HOST") {
        config.web.host = host;
        config.source = ConfigSource::Env;
    }
    if let Some(value) = lookup("NEWSDESK_WEB_PORT") {
        if let Some(port) = parse_env::<u16>("NEWSDESK_WEB_PORT", &value) {
            config.web.port = port;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Service URL override
    pub service_url: Option<String>,

    /// Default model override
    pub default_model: Option<String>,

    /// Generation timeout override (seconds)
    pub timeout_secs: Option<u64>,

    /// Article count override
    pub article_count: Option<usize>,

    /// Web host override
    pub host: Option<String>,

    /// Web port override
    pub port: Option<u16>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set service URL override
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    /// Set default model override
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Set generation timeout override
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set article count override
    #[must_use]
    pub fn with_article_count(mut self, count: usize) -> Self {
        self.article_count = Some(count);
        self
    }

    /// Set web host override
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set web port override
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    fn is_empty(&self) -> bool {
        self.service_url.is_none()
            && self.default_model.is_none()
            && self.timeout_secs.is_none()
            && self.article_count.is_none()
            && self.host.is_none()
            && self.port.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut NewsdeskConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.service_url {
            config.generation.service_url.clone_from(url);
        }
        if let Some(ref model) = self.default_model {
            config.generation.default_model.clone_from(model);
        }
        if let Some(secs) = self.timeout_secs {
            config.generation.timeout = Duration::from_secs(secs);
        }
        if let Some(count) = self.article_count {
            config.feeds.article_count = count;
        }
        if let Some(ref host) = self.host {
            config.web.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
