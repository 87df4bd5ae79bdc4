use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Digest returned when the provider has nothing for the topic.
pub const NO_NEWS_SENTINEL: &str = "no recent news found";

/// Number of headlines that make it into the digest.
pub const MAX_HEADLINES: usize = 5;

#[derive(Error, Debug)]
pub enum NewsFetchError {
    #[error("news request timed out after {0:?}")]
    Timeout(Duration),
    #[error("news request failed: {0}")]
    Transport(String),
    #[error("news API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode news response: {0}")]
    Decode(String),
}

/// A single record from the news provider. Other fields are ignored;
/// a missing title only matters if the article reaches the digest.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
}

impl Article {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

/// Keyword search against a news provider
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    async fn search(&self, keywords: &str, language: &str) -> Result<Vec<Article>, NewsFetchError>;
}

/// Fetch headlines for `topic` and fold them into a digest for the body prompt.
pub async fn fetch_recent_news<P: NewsProvider + ?Sized>(
    provider: &P,
    topic: &str,
    language: &str,
) -> Result<String, NewsFetchError> {
    let articles = provider.search(topic, language).await?;
    info!(topic, found = articles.len(), "news lookup complete");
    build_digest(&articles)
}

/// First `MAX_HEADLINES` titles joined by newlines, or the sentinel when empty.
/// Articles past the cutoff are never inspected.
pub fn build_digest(articles: &[Article]) -> Result<String, NewsFetchError> {
    if articles.is_empty() {
        return Ok(NO_NEWS_SENTINEL.to_string());
    }
    let titles = articles
        .iter()
        .take(MAX_HEADLINES)
        .enumerate()
        .map(|(i, a)| {
            a.title
                .as_deref()
                .ok_or_else(|| NewsFetchError::Decode(format!("article {} has no title", i)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(titles.join("\n"))
}

/// CurrentsAPI `latest-news` client
pub struct CurrentsNewsProvider {
    api_url: String,
    api_key: String,
    timeout: Duration,
    client: Client,
}

impl CurrentsNewsProvider {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newspost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build reqwest client: {}", e))?;

        Ok(Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestNewsResponse {
    #[serde(default)]
    news: Vec<Article>,
}

#[async_trait::async_trait]
impl NewsProvider for CurrentsNewsProvider {
    async fn search(&self, keywords: &str, language: &str) -> Result<Vec<Article>, NewsFetchError> {
        debug!(keywords, language, "querying news provider");

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("language", language),
                ("keywords", keywords),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(NewsFetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let parsed: LatestNewsResponse =
            serde_json::from_slice(&bytes).map_err(|e| NewsFetchError::Decode(e.to_string()))?;

        Ok(parsed.news)
    }
}

impl CurrentsNewsProvider {
    fn transport_error(&self, e: reqwest::Error) -> NewsFetchError {
        if e.is_timeout() {
            NewsFetchError::Timeout(self.timeout)
        } else {
            // Strip the URL: it carries the API key in the query string
            NewsFetchError::Transport(e.without_url().to_string())
        }
    }
}
