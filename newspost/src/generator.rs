//! Post generation pipeline: news lookup, then title, meta-description and body.
//!
//! Every stage runs once, in order. The first failure aborts the request and
//! nothing generated so far is returned.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use common::GenerationConfig;

use crate::llm::{LlmProvider, LlmRequest};
use crate::news::{fetch_recent_news, NewsFetchError, NewsProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub title: String,
    pub meta_description: String,
    pub post_content: String,
}

/// Pipeline stage, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NewsFetch,
    Title,
    Meta,
    Body,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::NewsFetch => "news-fetch",
            Stage::Title => "title-generation",
            Stage::Meta => "meta-generation",
            Stage::Body => "body-generation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("error fetching news: {0}")]
    NewsFetch(#[from] NewsFetchError),
    #[error("error generating title: {0}")]
    Title(String),
    #[error("error generating meta-description: {0}")]
    Meta(String),
    #[error("error generating post content: {0}")]
    Body(String),
}

impl GenerationError {
    pub fn stage(&self) -> Stage {
        match self {
            GenerationError::NewsFetch(_) => Stage::NewsFetch,
            GenerationError::Title(_) => Stage::Title,
            GenerationError::Meta(_) => Stage::Meta,
            GenerationError::Body(_) => Stage::Body,
        }
    }
}

/// Token caps and sampling parameters for the three generation calls
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub title_max_tokens: usize,
    pub meta_max_tokens: usize,
    pub body_max_tokens: usize,
    pub temperature: f32,
    pub samples: usize,
    pub news_language: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            title_max_tokens: 50,
            meta_max_tokens: 100,
            body_max_tokens: 1000,
            temperature: 0.7,
            samples: 1,
            news_language: common::DEFAULT_NEWS_LANGUAGE.to_string(),
        }
    }
}

impl GenerationSettings {
    pub fn from_config(cfg: &GenerationConfig, news_language: impl Into<String>) -> Self {
        let defaults = Self::default();
        Self {
            title_max_tokens: cfg.title_max_tokens.unwrap_or(defaults.title_max_tokens),
            meta_max_tokens: cfg.meta_max_tokens.unwrap_or(defaults.meta_max_tokens),
            body_max_tokens: cfg.body_max_tokens.unwrap_or(defaults.body_max_tokens),
            temperature: cfg.temperature.unwrap_or(defaults.temperature),
            samples: cfg.samples.unwrap_or(defaults.samples),
            news_language: news_language.into(),
        }
    }
}

pub fn title_prompt(topic: &str) -> String {
    format!("Come up with an attractive title for a post about: {}", topic)
}

pub fn meta_prompt(title: &str) -> String {
    format!(
        "Write a brief but informative meta-description for a post titled: {}",
        title
    )
}

pub fn body_prompt(topic: &str, digest: &str) -> String {
    format!(
        "Write a detailed and engaging blog post about: {}, taking into account the following recent news:\n\
         {}\n\n\
         Use short paragraphs, subheadings, examples and keywords for better readability and SEO optimization.",
        topic, digest
    )
}

pub struct PostGenerator {
    news: Arc<dyn NewsProvider>,
    llm: Arc<dyn LlmProvider>,
    settings: GenerationSettings,
}

impl PostGenerator {
    pub fn new(
        news: Arc<dyn NewsProvider>,
        llm: Arc<dyn LlmProvider>,
        settings: GenerationSettings,
    ) -> Self {
        Self { news, llm, settings }
    }

    pub async fn generate_post(&self, topic: &str) -> Result<GeneratedPost, GenerationError> {
        let digest = fetch_recent_news(self.news.as_ref(), topic, &self.settings.news_language).await?;

        let title = self
            .complete(
                Stage::Title,
                GenerationError::Title,
                title_prompt(topic),
                self.settings.title_max_tokens,
            )
            .await?;

        let meta_description = self
            .complete(
                Stage::Meta,
                GenerationError::Meta,
                meta_prompt(&title),
                self.settings.meta_max_tokens,
            )
            .await?;

        let post_content = self
            .complete(
                Stage::Body,
                GenerationError::Body,
                body_prompt(topic, &digest),
                self.settings.body_max_tokens,
            )
            .await?;

        Ok(GeneratedPost {
            title,
            meta_description,
            post_content,
        })
    }

    /// One generation call; the trimmed completion or a stage-labelled error.
    async fn complete(
        &self,
        stage: Stage,
        wrap: fn(String) -> GenerationError,
        prompt: String,
        max_tokens: usize,
    ) -> Result<String, GenerationError> {
        let request = LlmRequest {
            prompt,
            max_tokens: Some(max_tokens),
            n: Some(self.settings.samples),
            temperature: Some(self.settings.temperature),
            timeout_seconds: None,
        };

        let response = self.llm.generate(request).await.map_err(|e| {
            warn!(%stage, error = %e, "generation call failed");
            wrap(format!("{:#}", e))
        })?;

        let text = response.content.trim();
        if text.is_empty() {
            return Err(wrap("provider returned an empty completion".to_string()));
        }

        info!(
            %stage,
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "generation call complete"
        );
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_prompt_embeds_topic_and_digest() {
        let prompt = body_prompt("electric vehicles", "EV sales surge\nNew battery tech announced");
        assert!(prompt.contains("about: electric vehicles"));
        assert!(prompt.contains("EV sales surge\nNew battery tech announced"));
        assert!(prompt.contains("SEO"));
    }

    #[test]
    fn meta_prompt_uses_given_title() {
        assert!(meta_prompt("Charged Up").ends_with("titled: Charged Up"));
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let cfg = GenerationConfig {
            body_max_tokens: Some(1500),
            ..Default::default()
        };
        let settings = GenerationSettings::from_config(&cfg, "de");
        assert_eq!(settings.title_max_tokens, 50);
        assert_eq!(settings.meta_max_tokens, 100);
        assert_eq!(settings.body_max_tokens, 1500);
        assert_eq!(settings.samples, 1);
        assert_eq!(settings.news_language, "de");
    }

    #[test]
    fn errors_name_their_stage() {
        let err = GenerationError::Meta("boom".to_string());
        assert_eq!(err.stage(), Stage::Meta);
        assert_eq!(err.stage().to_string(), "meta-generation");
        assert_eq!(err.to_string(), "error generating meta-description: boom");
    }
}
