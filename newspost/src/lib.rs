// Library interface for newspost modules
// This allows tests and the binaries to import modules

pub mod generator;
pub mod llm;
pub mod news;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use common::{Config, Credentials};

use generator::{GenerationSettings, PostGenerator};
use llm::remote::RemoteLlmProvider;
use news::CurrentsNewsProvider;

/// Wire the remote providers into a generator using resolved credentials.
pub fn build_generator(config: &Config, credentials: &Credentials) -> Result<PostGenerator> {
    let news = CurrentsNewsProvider::new(
        config.news_api_url(),
        credentials.news_api_key.clone(),
        config.news_timeout_seconds(),
    )
    .context("failed to initialize news provider")?;

    let settings = GenerationSettings::from_config(&config.generation, config.news_language());

    let llm = RemoteLlmProvider::new(
        config.llm_api_url(),
        credentials.llm_api_key.clone(),
        config.llm_model(),
    )
    .with_defaults(
        config.llm_timeout_seconds(),
        settings.body_max_tokens,
        settings.temperature,
    );

    tracing::info!(
        model = %llm.model(),
        llm_url = %config.llm_api_url(),
        news_url = %config.news_api_url(),
        "providers initialized"
    );

    Ok(PostGenerator::new(Arc::new(news), Arc::new(llm), settings))
}
