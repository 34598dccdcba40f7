//! # Article Text Source
//!
//! Fetches a web page and keeps the text of its paragraphs.

use super::{AdapterError, SourceInput, TextSource, USER_AGENT, check_status};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::time::Duration;
use verisift_core::VerisiftError;

/// `TextSource` for news article URLs.
pub struct ArticleSource {
    http: reqwest::Client,
}

impl ArticleSource {
    pub fn new(timeout: Duration) -> Result<Self, VerisiftError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VerisiftError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { http })
    }

    async fn download(&self, url: &str) -> Result<String, AdapterError> {
        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.text().await?)
    }
}

/// Join the text of every `<p>` element, one paragraph per line.
///
/// `Html` is not `Send`, so parsing stays in this synchronous helper.
pub fn paragraph_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").ok()?;

    let paragraphs: Vec<String> = document
        .select(&selector)
        .map(|p| {
            p.text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect();

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join("\n"))
    }
}

#[async_trait]
impl TextSource for ArticleSource {
    async fn extract(&self, input: &SourceInput) -> Option<String> {
        let SourceInput::Url(url) = input else {
            tracing::debug!("Article source ignores uploads");
            return None;
        };
        match self.download(url).await {
            Ok(html) => paragraph_text(&html),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Article download failed");
                None
            }
        }
    }
}
