//! # Evidence Providers
//!
//! Social platforms searched for posts discussing the analysed text.
//! Providers never fail: every error becomes an `ERROR` result carrying
//! the provider's name.

use super::{AdapterError, EvidenceProvider, USER_AGENT, check_status};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use verisift_core::{EvidenceItem, EvidenceResult, VerisiftError};

/// Longest query forwarded to a search API.
const MAX_QUERY_CHARS: usize = 256;

fn http_client(timeout: Duration) -> Result<reqwest::Client, VerisiftError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| VerisiftError::InvalidConfig(format!("HTTP client: {e}")))
}

/// Search APIs reject very long queries; the head of the text is enough.
fn search_terms(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_QUERY_CHARS)
        .collect()
}

fn contained(name: &str, result: Result<Vec<EvidenceItem>, AdapterError>) -> EvidenceResult {
    match result {
        Ok(items) => EvidenceResult::success(name, items),
        Err(e) => {
            let message = format!("An unexpected error occurred with {name}: {e}");
            tracing::warn!(provider = name, error = %e, "Evidence provider failed");
            EvidenceResult::error(name, message)
        }
    }
}

// =============================================================================
// X
// =============================================================================

/// X (Twitter) recent search.
pub struct XProvider {
    http: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl XProvider {
    pub const NAME: &'static str = "X (Twitter)";
    pub const DEFAULT_BASE_URL: &'static str = "https://api.x.com/2";

    pub fn new(
        base_url: impl Into<String>,
        bearer_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, VerisiftError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.filter(|t| !t.trim().is_empty()),
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<EvidenceItem>, AdapterError> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or_else(|| AdapterError::Unavailable("bearer token is not configured".to_string()))?;

        let resp = self
            .http
            .get(format!("{}/tweets/search/recent", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("query", search_terms(query).as_str()),
                ("max_results", "10"),
                ("tweet.fields", "public_metrics,author_id"),
            ])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body: XSearchResponse = resp
            .json()
            .await
            .map_err(|e| AdapterError::Malformed(e.to_string()))?;

        Ok(body
            .data
            .into_iter()
            .map(|tweet| {
                let engagement = tweet.public_metrics.map_or(0, |m| {
                    m.like_count
                        .saturating_add(m.retweet_count)
                        .saturating_add(m.reply_count)
                });
                EvidenceItem {
                    source: Self::NAME.to_string(),
                    url: Some(format!("https://x.com/i/web/status/{}", tweet.id)),
                    text: tweet.text,
                    engagement_score: engagement,
                    user: tweet.author_id.unwrap_or_default(),
                }
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct XSearchResponse {
    // Absent when the search matched nothing.
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Deserialize)]
struct Tweet {
    id: String,
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    public_metrics: Option<PublicMetrics>,
}

#[derive(Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    retweet_count: i64,
    #[serde(default)]
    reply_count: i64,
}

#[async_trait]
impl EvidenceProvider for XProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(&self, query: &str) -> EvidenceResult {
        contained(Self::NAME, self.fetch(query).await)
    }
}

// =============================================================================
// REDDIT
// =============================================================================

/// Reddit public search.
pub struct RedditProvider {
    http: reqwest::Client,
    base_url: String,
}

impl RedditProvider {
    pub const NAME: &'static str = "Reddit";
    pub const DEFAULT_BASE_URL: &'static str = "https://www.reddit.com";

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, VerisiftError> {
        Ok(Self {
            http: http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn fetch(&self, query: &str) -> Result<Vec<EvidenceItem>, AdapterError> {
        let resp = self
            .http
            .get(format!("{}/search.json", self.base_url))
            .query(&[
                ("q", search_terms(query).as_str()),
                ("sort", "relevance"),
                ("limit", "3"),
            ])
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let listing: RedditListing = resp
            .json()
            .await
            .map_err(|e| AdapterError::Malformed(e.to_string()))?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| {
                let post = child.data;
                let text = if post.selftext.trim().is_empty() {
                    post.title
                } else {
                    format!("{}\n\n{}", post.title, post.selftext)
                };
                EvidenceItem {
                    source: Self::NAME.to_string(),
                    text,
                    engagement_score: post.score,
                    user: post.author,
                    url: post
                        .permalink
                        .map(|p| format!("https://www.reddit.com{p}")),
                }
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Deserialize)]
struct RedditPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    author: String,
    #[serde(default)]
    permalink: Option<String>,
}

#[async_trait]
impl EvidenceProvider for RedditProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn search(&self, query: &str) -> EvidenceResult {
        contained(Self::NAME, self.fetch(query).await)
    }
}
