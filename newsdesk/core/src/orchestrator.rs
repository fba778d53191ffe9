//! Digest Orchestrator
//!
//! Runs one digest: fetch articles, compose the prompt, generate the post,
//! then optionally generate a headline from that post. Steps are strictly
//! sequential because each one consumes the previous result, and the first
//! failure ends the run.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{GenerationError, TextGenerator};
use crate::feeds::{Article, ArticleSource, FeedError};
use crate::prompts::{compose_prompt, follow_up_prompt, PromptStyle};

/// Generation step that failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The social media post
    Post,
    /// The headline derived from the post
    FollowUp,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::FollowUp => write!(f, "follow-up"),
        }
    }
}

/// Why a digest run stopped
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Feeds could not be consulted at all
    #[error(transparent)]
    Feeds(#[from] FeedError),

    /// Every feed of the category came back empty
    #[error("No articles found for category {0:?}")]
    NoArticles(String),

    /// A generation exchange failed; later steps were skipped
    #[error("Generating the {stage} failed: {source}")]
    Generation {
        /// Step that failed
        stage: Stage,
        /// Underlying failure
        source: GenerationError,
    },
}

/// Parameters of one digest run
#[derive(Clone, Debug)]
pub struct DigestOptions {
    /// Feed category to read
    pub category: String,
    /// Articles taken from each feed
    pub article_count: usize,
    /// Tone of the post
    pub style: PromptStyle,
    /// Model override; `None` uses the generator's default
    pub model: Option<String>,
    /// Call the generation service; when false only the prompt is built
    pub generate: bool,
    /// Derive a headline from the generated post
    pub follow_up: bool,
}

impl DigestOptions {
    /// Options for `category` with defaults for everything else
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            article_count: 3,
            style: PromptStyle::default(),
            model: None,
            generate: true,
            follow_up: true,
        }
    }

    /// Set articles per feed
    #[must_use]
    pub fn with_article_count(mut self, count: usize) -> Self {
        self.article_count = count;
        self
    }

    /// Set prompt style
    #[must_use]
    pub fn with_style(mut self, style: PromptStyle) -> Self {
        self.style = style;
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Only build the prompt
    #[must_use]
    pub fn prompt_only(mut self) -> Self {
        self.generate = false;
        self
    }

    /// Enable or disable the headline step
    #[must_use]
    pub fn with_follow_up(mut self, follow_up: bool) -> Self {
        self.follow_up = follow_up;
        self
    }
}

/// Everything a surface needs to display one run
#[derive(Clone, Debug, Serialize)]
pub struct DigestReport {
    /// Category that was read
    pub category: String,
    /// Style of the post
    pub style: PromptStyle,
    /// Articles the prompt was built from
    pub articles: Vec<Article>,
    /// Prompt sent for the post
    pub prompt: String,
    /// Generated post, absent for prompt-only runs
    pub post: Option<String>,
    /// Headline derived from the post, when requested
    pub headline: Option<String>,
}

/// Sequences feeds, prompts and generation
pub struct Orchestrator<G, S> {
    generator: G,
    source: S,
}

impl<G, S> Orchestrator<G, S>
where
    G: TextGenerator,
    S: ArticleSource,
{
    /// Create an orchestrator over a generator and an article source
    pub fn new(generator: G, source: S) -> Self {
        Self { generator, source }
    }

    /// The text generator
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// The article source
    pub fn source(&self) -> &S {
        &self.source
    }

    async fn generate(
        &self,
        prompt: &str,
        model: Option<&str>,
        stage: Stage,
    ) -> Result<String, OrchestratorError> {
        let result = match model {
            Some(model) => self.generator.generate_with_model(prompt, model).await,
            None => self.generator.generate(prompt).await,
        };
        result.map_err(|source| {
            warn!(%stage, error = %source, "Halting digest run");
            OrchestratorError::Generation { stage, source }
        })
    }

    /// Run one digest
    ///
    /// # Errors
    ///
    /// Returns the first failure; nothing after it is attempted.
    pub async fn run(&self, options: &DigestOptions) -> Result<DigestReport, OrchestratorError> {
        let articles = self
            .source
            .articles(&options.category, options.article_count)
            .await?;
        if articles.is_empty() {
            return Err(OrchestratorError::NoArticles(options.category.clone()));
        }

        let prompt = compose_prompt(options.style, &articles);
        let mut report = DigestReport {
            category: options.category.clone(),
            style: options.style,
            articles,
            prompt,
            post: None,
            headline: None,
        };

        if !options.generate {
            return Ok(report);
        }

        let model = options.model.as_deref();
        let post = self.generate(&report.prompt, model, Stage::Post).await?;
        info!(
            backend = self.generator.name(),
            category = %report.category,
            style = %report.style,
            "Post generated"
        );

        if options.follow_up {
            let headline = self
                .generate(&follow_up_prompt(&post), model, Stage::FollowUp)
                .await?;
            report.headline = Some(headline);
        }

        report.post = Some(post);
        Ok(report)
    }
}
