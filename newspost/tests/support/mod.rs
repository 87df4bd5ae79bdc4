// Shared in-process provider doubles for integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use newspost::generator::{GenerationSettings, PostGenerator};
use newspost::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use newspost::news::{Article, NewsFetchError, NewsProvider};

/// News provider returning a fixed list of titles, or a fixed failure.
pub struct StaticNews {
    titles: Vec<String>,
    failure: Option<(u16, String)>,
    calls: AtomicUsize,
    last_query: Mutex<Option<(String, String)>>,
}

impl StaticNews {
    pub fn with_titles(titles: &[&str]) -> Self {
        Self {
            titles: titles.iter().map(|t| t.to_string()).collect(),
            failure: None,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self {
            titles: Vec::new(),
            failure: Some((status, body.to_string())),
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<(String, String)> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NewsProvider for StaticNews {
    async fn search(&self, keywords: &str, language: &str) -> Result<Vec<Article>, NewsFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some((keywords.to_string(), language.to_string()));

        if let Some((status, body)) = &self.failure {
            return Err(NewsFetchError::Status {
                status: *status,
                body: body.clone(),
            });
        }

        Ok(self
            .titles
            .iter()
            .map(|t| Article::titled(t.clone()))
            .collect())
    }
}

type Responder = Box<dyn Fn(usize, &LlmRequest) -> anyhow::Result<String> + Send + Sync>;

/// LLM double that records every request and answers through a closure
/// receiving the zero-based call index.
pub struct ScriptedLlm {
    respond: Responder,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize, &LlmRequest) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every call with its own prompt.
    pub fn echo() -> Self {
        Self::new(|_, req| Ok(req.prompt.clone()))
    }

    /// Answers calls in order with the given strings.
    pub fn fixed(answers: &[&str]) -> Self {
        let answers: Vec<String> = answers.iter().map(|a| a.to_string()).collect();
        Self::new(move |i, _| {
            answers
                .get(i)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unexpected call #{}", i))
        })
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse> {
        let index = {
            let mut seen = self.requests.lock().unwrap();
            seen.push(request.clone());
            seen.len() - 1
        };

        let content = (self.respond)(index, &request)?;
        Ok(LlmResponse {
            content,
            usage: UsageMetadata::default(),
            model: "stub".to_string(),
        })
    }
}

pub fn generator(news: Arc<StaticNews>, llm: Arc<ScriptedLlm>) -> PostGenerator {
    PostGenerator::new(news, llm, GenerationSettings::default())
}
