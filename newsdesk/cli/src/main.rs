//! newsdesk
//!
//! Turns the latest headlines of a news category into a social media post
//! using a local streaming generation service.
//!
//! # Usage
//!
//! ```bash
//! # One post from the cybersecurity feeds
//! newsdesk generate --category cybersecurity --count 2 --style satirical
//!
//! # Show the prompt without calling the service
//! newsdesk generate --category general --prompt-only
//!
//! # Web form on http://127.0.0.1:5000
//! newsdesk serve
//!
//! # With verbose logging
//! RUST_LOG=debug newsdesk generate
//! ```
//!
//! # Environment Variables
//!
//! - `NEWSDESK_CONFIG`: Config file path
//! - `NEWSDESK_SERVICE_URL`: Generate endpoint URL
//! - `NEWSDESK_DEFAULT_MODEL`: Model used when none is given
//! - `NEWSDESK_TIMEOUT_SECS`: Generation timeout
//! - `NEWSDESK_ARTICLE_COUNT`: Articles per feed
//! - `NEWSDESK_CACHE_TTL_SECS`: Feed cache lifetime (0 disables)
//! - `NEWSDESK_WEB_HOST` / `NEWSDESK_WEB_PORT`: Web bind address
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

mod render;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use newsdesk_core::{
    default_config_path, load_config_from_path, ConfigOverrides, DigestOptions, FeedFetcher,
    GenerationClient, NewsdeskConfig, Orchestrator, PromptStyle,
};

use crate::server::AppState;

#[derive(Debug, Parser)]
#[command(name = "newsdesk", version, about = "News digests written by a local model")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/newsdesk/newsdesk.toml)
    #[arg(long, global = true, env = "NEWSDESK_CONFIG")]
    config: Option<PathBuf>,

    /// Generate endpoint URL
    #[arg(long, global = true)]
    service_url: Option<String>,

    /// Model used when a request does not name one
    #[arg(long, global = true)]
    model: Option<String>,

    /// Generation timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch a category and generate a post from it
    Generate {
        /// News category (default: first configured category)
        #[arg(long)]
        category: Option<String>,

        /// Articles taken from each feed
        #[arg(long)]
        count: Option<usize>,

        /// Post style
        #[arg(long, default_value_t = PromptStyle::default())]
        style: PromptStyle,

        /// Print the prompt and stop
        #[arg(long)]
        prompt_only: bool,

        /// Skip the headline
        #[arg(long)]
        no_follow_up: bool,
    },

    /// Serve the web form
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(long)]
        port: Option<u16>,
    },

    /// List categories and styles
    List,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref url) = self.service_url {
            overrides = overrides.with_service_url(url);
        }
        if let Some(ref model) = self.model {
            overrides = overrides.with_default_model(model);
        }
        if let Some(secs) = self.timeout {
            overrides = overrides.with_timeout_secs(secs);
        }
        match self.command {
            Command::Generate {
                count: Some(count), ..
            } => overrides = overrides.with_article_count(count),
            Command::Serve { ref host, port } => {
                if let Some(host) = host {
                    overrides = overrides.with_host(host);
                }
                if let Some(port) = port {
                    overrides = overrides.with_port(port);
                }
            }
            _ => {}
        }
        overrides
    }
}

fn build_orchestrator(
    config: &NewsdeskConfig,
) -> anyhow::Result<Orchestrator<GenerationClient, FeedFetcher>> {
    let client = GenerationClient::new(config.generation.clone())
        .context("Failed to create generation client")?;
    let fetcher = FeedFetcher::new(&config.feeds).context("Failed to create feed fetcher")?;
    Ok(Orchestrator::new(client, fetcher))
}

fn list(config: &NewsdeskConfig) {
    println!("Categories:");
    for (name, feeds) in &config.feeds.categories {
        println!("  {name}");
        for url in feeds {
            println!("    {url}");
        }
    }
    println!();
    println!("Styles:");
    for style in PromptStyle::ALL {
        println!("  {:<14} {}", style.as_str(), style.label());
    }
}

async fn generate(
    config: &NewsdeskConfig,
    category: Option<String>,
    style: PromptStyle,
    prompt_only: bool,
    follow_up: bool,
) -> anyhow::Result<()> {
    let orchestrator = build_orchestrator(config)?;

    let category = match category {
        Some(category) => category,
        None => config
            .feeds
            .categories
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No news categories are configured"))?,
    };

    let mut options = DigestOptions::new(category)
        .with_article_count(config.feeds.article_count)
        .with_style(style)
        .with_follow_up(follow_up);
    if prompt_only {
        options = options.prompt_only();
    }

    let report = orchestrator.run(&options).await?;

    match report.post {
        Some(ref post) => {
            if let Some(ref headline) = report.headline {
                println!("{headline}");
                println!();
            }
            println!("{post}");
        }
        None => println!("{}", report.prompt),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("newsdesk=info".parse()?)
                .add_directive("newsdesk_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let mut config = load_config_from_path(cli.config.clone().or_else(default_config_path))
        .context("Failed to load configuration")?;
    cli.overrides().apply(&mut config);
    config.validate().context("Configuration rejected")?;
    debug!(source = %config.source(), path = ?config.config_file_path, "Configuration loaded");

    match cli.command {
        Command::Generate {
            category,
            style,
            prompt_only,
            no_follow_up,
            ..
        } => generate(&config, category, style, prompt_only, !no_follow_up).await,
        Command::Serve { .. } => {
            let orchestrator = build_orchestrator(&config)?;
            let state = Arc::new(AppState::new(orchestrator, config.feeds.article_count));
            info!(
                service_url = %config.generation.service_url,
                model = %config.generation.default_model,
                "Starting web surface"
            );
            server::serve(state, &config.web).await
        }
        Command::List => {
            list(&config);
            Ok(())
        }
    }
}
