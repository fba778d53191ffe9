//! Web surface
//!
//! A small axum router over a shared [`Orchestrator`]. Pages are rendered
//! by [`crate::render`]; the orchestrator is generic so tests can drive the
//! router with in-memory collaborators.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, instrument, warn};

use newsdesk_core::{
    ArticleSource, DigestOptions, FeedError, Orchestrator, OrchestratorError, PromptStyle,
    TextGenerator, WebConfig,
};

use crate::render::{self, FormState};

/// Shared state of the web surface
pub struct AppState<G, S> {
    orchestrator: Orchestrator<G, S>,
    categories: Vec<String>,
    article_count: usize,
}

impl<G, S> AppState<G, S>
where
    G: TextGenerator,
    S: ArticleSource,
{
    /// Wrap an orchestrator; `article_count` is used when a request omits
    /// a usable count
    pub fn new(orchestrator: Orchestrator<G, S>, article_count: usize) -> Self {
        let categories = orchestrator.source().categories();
        Self {
            orchestrator,
            categories,
            article_count,
        }
    }

    fn default_category(&self) -> &str {
        self.categories.first().map_or("general", String::as_str)
    }
}

/// Query string of `/digest`
///
/// Every field is optional text so that bad input degrades to defaults
/// instead of a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct DigestQuery {
    /// Feed category
    pub category: Option<String>,
    /// Articles per feed
    pub count: Option<String>,
    /// Prompt style name
    pub style: Option<String>,
    /// Model override
    pub model: Option<String>,
    /// Show the composed prompt without calling the service
    pub prompt_only: Option<String>,
}

/// Checkbox-style flag: present and not explicitly off
fn parse_flag(raw: Option<&str>) -> bool {
    raw.map(str::trim).is_some_and(|v| {
        !matches!(
            v.to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "off" | "no"
        )
    })
}

/// Positive article count, or `fallback`
fn parse_count(raw: Option<&str>, fallback: usize) -> usize {
    raw.and_then(|c| c.trim().parse::<i64>().ok())
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(fallback)
}

/// Creates the web router
pub fn create_router<G, S>(state: Arc<AppState<G, S>>) -> Router
where
    G: TextGenerator + 'static,
    S: ArticleSource + 'static,
{
    Router::new()
        .route("/", get(index::<G, S>))
        .route("/digest", get(digest::<G, S>))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind and serve until Ctrl+C or SIGTERM
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve<G, S>(state: Arc<AppState<G, S>>, web: &WebConfig) -> anyhow::Result<()>
where
    G: TextGenerator + 'static,
    S: ArticleSource + 'static,
{
    let listener = TcpListener::bind((web.host.as_str(), web.port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}:{}: {}", web.host, web.port, e))?;
    info!(addr = %listener.local_addr()?, "Web surface listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web surface stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Health check endpoint.
#[instrument(skip_all)]
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[instrument(skip_all)]
async fn index<G, S>(State(state): State<Arc<AppState<G, S>>>) -> Html<String>
where
    G: TextGenerator,
    S: ArticleSource,
{
    Html(render::index(&FormState {
        categories: &state.categories,
        category: state.default_category(),
        count: state.article_count,
        style: PromptStyle::default(),
        prompt_only: false,
    }))
}

#[instrument(skip_all)]
async fn digest<G, S>(
    State(state): State<Arc<AppState<G, S>>>,
    Query(query): Query<DigestQuery>,
) -> Response
where
    G: TextGenerator,
    S: ArticleSource,
{
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| state.default_category())
        .to_string();
    let count = parse_count(query.count.as_deref(), state.article_count);
    let style = PromptStyle::parse_or_serious(query.style.as_deref().unwrap_or_default());

    let mut options = DigestOptions::new(category.as_str())
        .with_article_count(count)
        .with_style(style);
    if let Some(model) = query.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        options = options.with_model(model);
    }
    let prompt_only = parse_flag(query.prompt_only.as_deref());
    if prompt_only {
        options = options.prompt_only();
    }

    let form = FormState {
        categories: &state.categories,
        category: &category,
        count,
        style,
        prompt_only,
    };

    match state.orchestrator.run(&options).await {
        Ok(report) => Html(render::digest(&form, &report)).into_response(),
        Err(OrchestratorError::NoArticles(_)) => (
            StatusCode::NOT_FOUND,
            Html(render::error(&form, "No articles found.")),
        )
            .into_response(),
        Err(e @ OrchestratorError::Feeds(FeedError::UnknownCategory(_))) => (
            StatusCode::NOT_FOUND,
            Html(render::error(&form, &e.to_string())),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Digest request failed");
            (
                StatusCode::BAD_GATEWAY,
                Html(render::error(&form, &e.to_string())),
            )
                .into_response()
        }
    }
}
