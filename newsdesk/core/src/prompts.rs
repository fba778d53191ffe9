//! Prompt styles and composition
//!
//! A prompt is an instruction block for the chosen [`PromptStyle`] followed
//! by a digest of the fetched articles. The follow-up prompt interpolates the
//! text produced by the first exchange.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::feeds::Article;

const SATIRICAL: &str = "
Create catchy, satirical social media posts using the provided news articles.
For each article, generate a witty and humorous headline that critiques or pokes fun at the subject in a lighthearted way.
Keep the tone entertaining and shareable, while avoiding offensive material. Limit the content to 520 characters or less.
Include the URL for each original article at the end for readers to follow the full story.
";

const SERIOUS: &str = "
Create punchy, serious news posts for social media from the provided articles.
For each article, craft an engaging headline and a brief summary focusing on the key facts or updates.
Make the content clear, direct, and shareable in 520 characters or less.
Add the URL for each original article to allow readers to explore the full story.
";

const BREAKING_NEWS: &str = "
Create a breaking news-style post for social media using the provided articles.
For each article, write a bold and attention-grabbing headline that highlights the most urgent or shocking aspect of the news.
Summarize the core of the story in a concise, engaging way that can fit within 520 characters.
Include the URL for each original article so readers can follow for more details.
";

const TREND_SUMMARY: &str = "
Create trending topic posts for Instagram or Facebook using the provided articles.
For each article, summarize the key points with a captivating headline and a brief description that will catch the reader's attention in under 520 characters.
Make sure the post is visually engaging and shareable, and include a URL to the original news article for more information.
";

const NEWS_ESSAY: &str = "
Create a comprehensive yet social-media-friendly news post using the provided articles.
For each article, generate a quick but insightful headline and a 520 characters description focusing on the main news angles.
Make it suitable for both Twitter and Facebook, linking to the original article for users to read more.
Keep it concise and actionable in 280 characters or less.
";

/// Tone of the generated post
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStyle {
    /// Witty headlines poking fun at the story
    Satirical,
    /// Headline plus key facts
    Serious,
    /// Urgent, attention-grabbing headline
    BreakingNews,
    /// Instagram/Facebook trending-topic post
    TrendSummary,
    /// Short essay suitable for several networks
    #[default]
    NewsEssay,
}

impl PromptStyle {
    /// Every style, in menu order
    pub const ALL: [PromptStyle; 5] = [
        Self::Satirical,
        Self::Serious,
        Self::BreakingNews,
        Self::TrendSummary,
        Self::NewsEssay,
    ];

    /// Identifier used in configuration, URLs and the CLI
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Satirical => "satirical",
            Self::Serious => "serious",
            Self::BreakingNews => "breaking_news",
            Self::TrendSummary => "trend_summary",
            Self::NewsEssay => "news_essay",
        }
    }

    /// Human-readable menu label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Satirical => "Satirical Post",
            Self::Serious => "Serious Post",
            Self::BreakingNews => "Breaking News Post",
            Self::TrendSummary => "Trending Post",
            Self::NewsEssay => "News Essay Post",
        }
    }

    /// Instruction block placed before the article digest
    #[must_use]
    pub fn instructions(self) -> &'static str {
        match self {
            Self::Satirical => SATIRICAL,
            Self::Serious => SERIOUS,
            Self::BreakingNews => BREAKING_NEWS,
            Self::TrendSummary => TREND_SUMMARY,
            Self::NewsEssay => NEWS_ESSAY,
        }
    }

    /// Parse a style name, falling back to [`PromptStyle::Serious`]
    #[must_use]
    pub fn parse_or_serious(name: &str) -> Self {
        name.parse().unwrap_or(Self::Serious)
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| format!("unknown prompt style: {s}"))
    }
}

/// Markdown digest of the articles, one block per article
#[must_use]
pub fn render_articles(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|article| {
            format!(
                "**Title:** {}\n**Description:** {}\n**Published:** {}\n**Source:** {}\n**URL:** {}\n",
                article.title, article.summary, article.published, article.source, article.link
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instruction block for `style` followed by the article digest
#[must_use]
pub fn compose_prompt(style: PromptStyle, articles: &[Article]) -> String {
    format!("{}\n\n{}", style.instructions(), render_articles(articles))
}

/// Second-stage prompt built from the first generated post
#[must_use]
pub fn follow_up_prompt(post: &str) -> String {
    format!(
        "Condense the following social media post into one headline of at most 100 characters.\n\
         Reply with the headline only.\n\n{post}"
    )
}
