//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file
//! (`--config`), then command-line flags and environment variables
//! (see [`crate::cli::Cli::apply_overrides`]).
//!
//! ```yaml
//! news:
//!   max_articles: 5
//! inference:
//!   sentiment_model: cardiffnlp/twitter-roberta-base-sentiment-latest
//! translation:
//!   target_language: hi
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub news: NewsConfig,
    pub inference: InferenceConfig,
    pub translation: TranslationConfig,
    pub speech: SpeechConfig,
    pub retry: RetryConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file; missing keys keep their defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&raw)?;
        info!("Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Article search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Stop once this many articles have been collected.
    pub max_articles: usize,
    /// Search endpoint; `q` and `page` are appended.
    pub search_url: String,
    /// Base used to resolve relative article links.
    pub site_url: String,
    /// Lower bound of the random pause between result pages.
    pub page_delay_min_ms: u64,
    /// Upper bound of the random pause between result pages.
    pub page_delay_max_ms: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            max_articles: 10,
            search_url: "https://www.bbc.co.uk/search".to_string(),
            site_url: "https://www.bbc.co.uk".to_string(),
            page_delay_min_ms: 1000,
            page_delay_max_ms: 3000,
        }
    }
}

/// Hosted inference settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Model ids are appended to this URL.
    pub base_url: String,
    /// Bearer token; usually supplied through `HF_API_TOKEN`.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub summarization_model: String,
    pub sentiment_model: String,
    pub ner_model: String,
    pub summary_max_length: u32,
    pub summary_min_length: u32,
    /// Inputs longer than this are cut on a char boundary before sending.
    pub max_input_chars: usize,
    /// Entity groups kept as topics.
    pub topic_entity_groups: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.huggingface.co/hf-inference/models".to_string(),
            api_token: None,
            summarization_model: "facebook/bart-large-cnn".to_string(),
            sentiment_model: "distilbert/distilbert-base-uncased-finetuned-sst-2-english"
                .to_string(),
            ner_model: "dslim/bert-base-NER".to_string(),
            summary_max_length: 130,
            summary_min_length: 50,
            max_input_chars: 3000,
            topic_entity_groups: ["ORG", "PRODUCT", "GPE", "LOC", "MISC"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub source_language: String,
    pub target_language: String,
    pub endpoint: String,
    /// Longest chunk sent in one request.
    pub max_chunk_chars: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "hi".to_string(),
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            max_chunk_chars: 1800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    /// MP3 files are written here.
    pub audio_dir: PathBuf,
    /// The service rejects longer inputs, so text is split on word boundaries.
    pub max_chunk_chars: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.google.com/translate_tts".to_string(),
            audio_dir: PathBuf::from("audio"),
            max_chunk_chars: 100,
        }
    }
}

/// Backoff for outbound HTTP calls. Zero retries keeps every call single-shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
        }
    }
}

impl HttpConfig {
    /// Build the shared reqwest client used by every outbound collaborator.
    pub fn client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .build()?)
    }
}
