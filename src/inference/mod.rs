//! Per-article enrichment through pre-trained inference pipelines.
//!
//! # Architecture
//!
//! One trait per pipeline, so each can be swapped or stubbed on its own:
//! - [`Summarizer`]: abstractive summary of the article body
//! - [`SentimentClassifier`]: Positive / Negative / Neutral label
//! - [`EntityRecognizer`]: named entities used as topics
//!
//! [`HuggingFaceClient`] implements all three against the hosted inference
//! API. [`Enricher`] combines them and degrades every failure to a sentinel
//! so one broken pipeline never aborts a request.

use crate::error::Result;
use crate::models::{Article, EnrichedArticle, SUMMARY_UNAVAILABLE, Sentiment};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

pub mod huggingface;
pub mod topics;

pub use huggingface::HuggingFaceClient;

/// Content shorter than this is its own summary.
pub const MIN_SUMMARY_INPUT_CHARS: usize = 50;
/// Only the head of the article is classified.
pub const SENTIMENT_INPUT_CHARS: usize = 500;

/// A named entity as returned by an aggregated token-classification pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity group such as `ORG`, `LOC` or `MISC`.
    #[serde(alias = "entity")]
    pub entity_group: String,
    /// The surface text of the entity.
    pub word: String,
    #[serde(default)]
    pub score: f64,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Sentiment>;
}

#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    async fn entities(&self, text: &str) -> Result<Vec<Entity>>;
}

/// Runs the three pipelines over an article.
#[derive(Clone)]
pub struct Enricher {
    summarizer: Arc<dyn Summarizer>,
    classifier: Arc<dyn SentimentClassifier>,
    recognizer: Arc<dyn EntityRecognizer>,
    topic_groups: Vec<String>,
}

impl Enricher {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        classifier: Arc<dyn SentimentClassifier>,
        recognizer: Arc<dyn EntityRecognizer>,
        topic_groups: Vec<String>,
    ) -> Self {
        Self {
            summarizer,
            classifier,
            recognizer,
            topic_groups,
        }
    }

    /// Build an enricher whose three pipelines are served by one client.
    pub fn from_client<C>(client: Arc<C>, topic_groups: Vec<String>) -> Self
    where
        C: Summarizer + SentimentClassifier + EntityRecognizer + 'static,
    {
        Self::new(client.clone(), client.clone(), client, topic_groups)
    }

    /// Summarize, classify and tag one article.
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    pub async fn enrich(&self, article: &Article) -> EnrichedArticle {
        let t0 = Instant::now();
        let summary = self.summary(&article.content).await;
        let sentiment = self.sentiment(&article.content).await;
        let topics = self.topics(&article.content).await;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            sentiment = ?sentiment,
            topics = topics.len(),
            "Enriched article"
        );

        EnrichedArticle {
            article: article.clone(),
            summary,
            sentiment,
            topics,
        }
    }

    async fn summary(&self, content: &str) -> String {
        if content.chars().count() < MIN_SUMMARY_INPUT_CHARS {
            return content.to_string();
        }
        match self.summarizer.summarize(content).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }

    async fn sentiment(&self, content: &str) -> Option<Sentiment> {
        let head = truncate_chars(content, SENTIMENT_INPUT_CHARS);
        match self.classifier.classify(head).await {
            Ok(sentiment) => Some(sentiment),
            Err(e) => {
                warn!(error = %e, "Sentiment analysis failed");
                None
            }
        }
    }

    async fn topics(&self, content: &str) -> Vec<String> {
        let entities = match self.recognizer.entities(content).await {
            Ok(entities) => entities,
            Err(e) => {
                warn!(error = %e, "Entity recognition failed; using keyword topics");
                Vec::new()
            }
        };
        let topics = topics::entity_topics(&entities, &self.topic_groups);
        if topics.is_empty() {
            topics::keyword_topics(content)
        } else {
            topics
        }
    }
}
