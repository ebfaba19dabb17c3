//! Hosted inference API client.
//!
//! Every pipeline is a `POST {base_url}/{model}` with a JSON body of the form
//! `{"inputs": ..., "parameters": {...}}` and a bearer token. The response
//! shape depends on the task:
//!
//! | Task | Response |
//! |------|----------|
//! | summarization | `[{"summary_text": "..."}]` |
//! | text-classification | `[[{"label": "POSITIVE", "score": 0.99}, ...]]` (or flat) |
//! | token-classification | `[{"entity_group": "ORG", "word": "Tesla", "score": 0.99, ...}]` |
//!
//! Models that are still loading answer `503`; pair the client with a
//! non-zero [`Backoff`] when that matters.

use super::{Entity, EntityRecognizer, SentimentClassifier, Summarizer};
use crate::config::InferenceConfig;
use crate::error::{Error, Result};
use crate::models::Sentiment;
use crate::retry::Backoff;
use crate::utils::{truncate_chars, truncate_for_log};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{debug, instrument, warn};

pub struct HuggingFaceClient {
    client: Client,
    config: InferenceConfig,
    backoff: Backoff,
}

impl std::fmt::Debug for HuggingFaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HuggingFaceClient")
            .field("base_url", &self.config.base_url)
            .field("summarization_model", &self.config.summarization_model)
            .field("sentiment_model", &self.config.sentiment_model)
            .field("ner_model", &self.config.ner_model)
            .field("has_token", &self.config.api_token.is_some())
            .finish()
    }
}

impl HuggingFaceClient {
    pub fn new(client: Client, config: InferenceConfig, backoff: Backoff) -> Self {
        if config.api_token.is_none() {
            warn!("No inference API token configured; requests may be rejected or throttled");
        }
        Self {
            client,
            config,
            backoff,
        }
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), model)
    }

    /// POST `body` to `model` and decode the response as `T`.
    #[instrument(level = "info", skip(self, body))]
    async fn infer<T: DeserializeOwned>(&self, model: &str, body: &Value) -> Result<T> {
        let url = self.model_url(model);
        let url = url.as_str();
        let t0 = Instant::now();
        let res = self
            .backoff
            .run(model, || async move {
                let mut req = self.client.post(url).json(body);
                if let Some(token) = &self.config.api_token {
                    req = req.bearer_auth(token);
                }
                let resp = req.send().await?;
                let status = resp.status();
                let text = resp.text().await?;
                if !status.is_success() {
                    return Err(Error::Inference(format!(
                        "{} returned {}: {}",
                        model,
                        status,
                        truncate_for_log(&text, 300)
                    )));
                }
                serde_json::from_str::<T>(&text).map_err(|e| {
                    Error::Inference(format!(
                        "{} returned unexpected payload ({}): {}",
                        model,
                        e,
                        truncate_for_log(&text, 300)
                    ))
                })
            })
            .await;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            ok = res.is_ok(),
            "Inference call finished"
        );
        res
    }

    fn clip<'a>(&self, text: &'a str) -> &'a str {
        truncate_chars(text, self.config.max_input_chars)
    }
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationOutput {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassificationOutput {
    /// Highest-scoring label for the first input.
    fn top_label(&self) -> Option<&LabelScore> {
        let scores: &[LabelScore] = match self {
            ClassificationOutput::Nested(outer) => {
                outer.first().map(Vec::as_slice).unwrap_or_default()
            }
            ClassificationOutput::Flat(flat) => flat,
        };
        scores.iter().max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

fn sentiment_from_output(output: &ClassificationOutput) -> Result<Sentiment> {
    let top = output
        .top_label()
        .ok_or_else(|| Error::Inference("classifier returned no labels".to_string()))?;
    Sentiment::from_label(&top.label)
        .ok_or_else(|| Error::Inference(format!("unknown sentiment label {:?}", top.label)))
}

#[async_trait]
impl Summarizer for HuggingFaceClient {
    async fn summarize(&self, text: &str) -> Result<String> {
        let body = json!({
            "inputs": self.clip(text),
            "parameters": {
                "max_length": self.config.summary_max_length,
                "min_length": self.config.summary_min_length,
                "do_sample": false,
            }
        });
        let output: Vec<SummaryOutput> = self.infer(&self.config.summarization_model, &body).await?;
        output
            .into_iter()
            .next()
            .map(|s| s.summary_text.trim().to_string())
            .ok_or_else(|| Error::Inference("summarizer returned no summary".to_string()))
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClient {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let body = json!({ "inputs": self.clip(text) });
        let output: ClassificationOutput = self.infer(&self.config.sentiment_model, &body).await?;
        sentiment_from_output(&output)
    }
}

#[async_trait]
impl EntityRecognizer for HuggingFaceClient {
    async fn entities(&self, text: &str) -> Result<Vec<Entity>> {
        let body = json!({
            "inputs": self.clip(text),
            "parameters": { "aggregation_strategy": "simple" }
        });
        self.infer(&self.config.ner_model, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_classification_output() {
        let raw = r#"[[{"label":"NEGATIVE","score":0.12},{"label":"POSITIVE","score":0.88}]]"#;
        let output: ClassificationOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(sentiment_from_output(&output).unwrap(), Sentiment::Positive);
    }

    #[test]
    fn test_flat_classification_output() {
        let raw = r#"[{"label":"LABEL_1","score":0.7},{"label":"LABEL_0","score":0.2}]"#;
        let output: ClassificationOutput = serde_json::from_str(raw).unwrap();
        assert_eq!(sentiment_from_output(&output).unwrap(), Sentiment::Neutral);
    }

    #[test]
    fn test_empty_or_unknown_classification_is_error() {
        let empty: ClassificationOutput = serde_json::from_str("[[]]").unwrap();
        assert!(sentiment_from_output(&empty).is_err());
        let unknown: ClassificationOutput =
            serde_json::from_str(r#"[{"label":"joy","score":0.9}]"#).unwrap();
        assert!(sentiment_from_output(&unknown).is_err());
    }

    #[test]
    fn test_entity_payload() {
        let raw = r#"[
            {"entity_group":"ORG","score":0.998,"word":"Tesla","start":0,"end":5},
            {"entity":"LOC","score":0.91,"word":"Berlin","start":20,"end":26}
        ]"#;
        let entities: Vec<Entity> = serde_json::from_str(raw).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_group, "ORG");
        assert_eq!(entities[1].entity_group, "LOC");
        assert_eq!(entities[1].word, "Berlin");
    }

    #[test]
    fn test_model_url_joins_base() {
        let config = InferenceConfig {
            base_url: "https://example.test/models/".to_string(),
            ..InferenceConfig::default()
        };
        let client = HuggingFaceClient::new(Client::new(), config, Backoff::none());
        assert_eq!(
            client.model_url("dslim/bert-base-NER"),
            "https://example.test/models/dslim/bert-base-NER"
        );
    }
}
