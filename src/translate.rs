//! Machine translation of the composed report.
//!
//! [`GoogleTranslator`] talks to the public `translate_a/single` endpoint
//! (`client=gtx`, `dt=t`). The endpoint caps request size, so the text is
//! sent in line-aligned chunks and the translations are re-joined with
//! newlines.

use crate::config::TranslationConfig;
use crate::error::{Error, Result};
use crate::retry::Backoff;
use crate::utils::chunk_lines;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_language` (an ISO 639-1 code).
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    config: TranslationConfig,
    backoff: Backoff,
}

impl GoogleTranslator {
    pub fn new(client: Client, config: TranslationConfig, backoff: Backoff) -> Self {
        Self {
            client,
            config,
            backoff,
        }
    }

    async fn translate_chunk(&self, chunk: &str, target_language: &str) -> Result<String> {
        let params = [
            ("client", "gtx"),
            ("sl", self.config.source_language.as_str()),
            ("tl", target_language),
            ("dt", "t"),
            ("q", chunk),
        ];
        let params = &params;
        let payload: Value = self
            .backoff
            .run("translate", || async move {
                let resp = self
                    .client
                    .get(&self.config.endpoint)
                    .query(params)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(resp.json::<Value>().await?)
            })
            .await?;
        parse_translation(&payload)
    }
}

/// Concatenate the translated segments of a `translate_a/single` payload.
///
/// The payload is a nested array whose first element lists
/// `[translated, original, ...]` segments.
pub fn parse_translation(payload: &Value) -> Result<String> {
    let segments = payload
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Translation("unexpected response shape".to_string()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        return Err(Error::Translation("empty translation".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl Translator for GoogleTranslator {
    #[instrument(level = "info", skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        if target_language.eq_ignore_ascii_case(&self.config.source_language) {
            return Ok(text.to_string());
        }
        let chunks = chunk_lines(text, self.config.max_chunk_chars);
        if chunks.is_empty() {
            return Ok(String::new());
        }

        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!(index = i, chars = chunk.chars().count(), "Translating chunk");
            translated.push(self.translate_chunk(chunk, target_language).await?);
        }
        info!(chunks = translated.len(), "Translated report");
        Ok(translated.join("\n"))
    }
}
