//! News Feeds
//!
//! Article model plus RSS/Atom fetching. Feeds are grouped into named
//! categories (see [`FeedConfig`](crate::config::FeedConfig)); a category is
//! fetched feed by feed, in configuration order, and the first `limit` entries
//! of each feed are kept.
//!
//! A feed that cannot be downloaded or parsed is logged and skipped so one
//! broken source never empties a whole category. Category results are
//! memoized in a [`TtlCache`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::config::FeedConfig;

const NO_TITLE: &str = "No Title";
const NO_DESCRIPTION: &str = "No Description";
const UNKNOWN_DATE: &str = "Unknown Date";

/// One news item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline
    pub title: String,
    /// Link to the full story
    pub link: String,
    /// Description or summary as published by the feed
    pub summary: String,
    /// Publication date (RFC 2822) or "Unknown Date"
    pub published: String,
    /// Feed host without a leading `www.`
    pub source: String,
}

/// Errors from feed fetching
#[derive(Debug, Error)]
pub enum FeedError {
    /// The category is not configured
    #[error("Unknown news category: {0}")]
    UnknownCategory(String),

    /// Download failed or returned an error status
    #[error("Failed to download feed: {0}")]
    Http(#[from] reqwest::Error),

    /// The document is not a readable RSS/Atom feed
    #[error("Failed to parse feed {url}: {source}")]
    Parse {
        /// Feed URL
        url: String,
        /// Parser error
        source: feed_rs::parser::ParseFeedError,
    },
}

/// Host part of a feed URL with any `www.` prefix removed
#[must_use]
pub fn source_name(feed_url: &str) -> String {
    reqwest::Url::parse(feed_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .map_or_else(
            || feed_url.to_string(),
            |host| host.strip_prefix("www.").unwrap_or(host.as_str()).to_string(),
        )
}

/// Parse a feed document and keep its first `limit` linked entries
///
/// # Errors
///
/// Returns [`FeedError::Parse`] if the bytes are not RSS or Atom.
pub fn parse_feed(bytes: &[u8], feed_url: &str, limit: usize) -> Result<Vec<Article>, FeedError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|source| FeedError::Parse {
        url: feed_url.to_string(),
        source,
    })?;
    let source = source_name(feed_url);

    let articles = feed
        .entries
        .into_iter()
        .take(limit)
        .filter_map(|entry| {
            // An entry without a link cannot be cited
            let link = entry.links.first()?.href.clone();
            Some(Article {
                title: entry
                    .title
                    .map_or_else(|| NO_TITLE.to_string(), |t| t.content),
                link,
                summary: entry
                    .summary
                    .map_or_else(|| NO_DESCRIPTION.to_string(), |t| t.content),
                published: entry
                    .published
                    .or(entry.updated)
                    .map_or_else(|| UNKNOWN_DATE.to_string(), |d| d.to_rfc2822()),
                source: source.clone(),
            })
        })
        .collect();

    Ok(articles)
}

/// Supplier of articles for a category
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Known category names
    fn categories(&self) -> Vec<String>;

    /// Up to `limit` articles from each feed of `category`
    async fn articles(&self, category: &str, limit: usize) -> Result<Vec<Article>, FeedError>;
}

/// Downloads and memoizes feeds over HTTP
pub struct FeedFetcher {
    categories: BTreeMap<String, Vec<String>>,
    http_client: reqwest::Client,
    cache: TtlCache<(String, usize), Vec<Article>>,
}

impl FeedFetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            categories: config.categories.clone(),
            http_client,
            cache: TtlCache::new(config.cache_ttl),
        })
    }

    /// Download and parse one feed
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] on network failure or error status, and
    /// [`FeedError::Parse`] for unreadable documents.
    pub async fn fetch_feed(&self, url: &str, limit: usize) -> Result<Vec<Article>, FeedError> {
        let bytes = self
            .http_client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        parse_feed(&bytes, url, limit)
    }

    /// Fetch every feed of `category`, skipping feeds that fail
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::UnknownCategory`] if the category is not configured.
    pub async fn fetch_category(
        &self,
        category: &str,
        limit: usize,
    ) -> Result<Vec<Article>, FeedError> {
        let key = (category.to_string(), limit);
        if let Some(articles) = self.cache.get(&key) {
            debug!(category, limit, count = articles.len(), "Feed cache hit");
            return Ok(articles);
        }

        let feeds = self
            .categories
            .get(category)
            .ok_or_else(|| FeedError::UnknownCategory(category.to_string()))?;

        let mut articles = Vec::new();
        for url in feeds {
            match self.fetch_feed(url, limit).await {
                Ok(mut fetched) => {
                    debug!(url = %url, count = fetched.len(), "Fetched feed");
                    articles.append(&mut fetched);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping feed");
                }
            }
        }

        info!(category, count = articles.len(), "Fetched category");
        let purged = self.cache.purge_expired();
        if purged > 0 {
            debug!(purged, "Dropped expired feed results");
        }
        self.cache.insert(key, articles.clone());
        Ok(articles)
    }
}

#[async_trait]
impl ArticleSource for FeedFetcher {
    fn categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    async fn articles(&self, category: &str, limit: usize) -> Result<Vec<Article>, FeedError> {
        self.fetch_category(category, limit).await
    }
}
