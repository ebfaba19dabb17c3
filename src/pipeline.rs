//! Request orchestration: fetch, enrich, compare, compose, translate, speak.
//!
//! [`NewsAnalyzer`] owns every collaborator behind a trait object. The
//! concrete clients are built once at start-up by [`NewsAnalyzer::from_config`]
//! and shared read-only across requests; tests inject stubs through
//! [`NewsAnalyzer::new`].

use crate::analysis;
use crate::config::AppConfig;
use crate::error::Result;
use crate::inference::{Enricher, HuggingFaceClient};
use crate::models::{AnalysisResponse, ArticleReport, ErrorResponse, NO_ARTICLES, TTS_FAILED};
use crate::report;
use crate::retry::Backoff;
use crate::scrapers::{ArticleSource, BbcSearch};
use crate::translate::{GoogleTranslator, Translator};
use crate::tts::{GoogleTts, SpeechSynthesizer};
use crate::utils::slugify_title;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Complete(AnalysisResponse),
    /// The search found nothing; no enrichment was attempted.
    NoArticles(ErrorResponse),
}

#[derive(Clone)]
pub struct NewsAnalyzer {
    source: Arc<dyn ArticleSource>,
    enricher: Enricher,
    translator: Arc<dyn Translator>,
    speech: Arc<dyn SpeechSynthesizer>,
    max_articles: usize,
    language: String,
}

impl NewsAnalyzer {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        enricher: Enricher,
        translator: Arc<dyn Translator>,
        speech: Arc<dyn SpeechSynthesizer>,
        max_articles: usize,
        language: impl Into<String>,
    ) -> Self {
        Self {
            source,
            enricher,
            translator,
            speech,
            max_articles,
            language: language.into(),
        }
    }

    /// Build the production collaborators from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = config.http.client()?;
        let backoff = Backoff::from(&config.retry);

        let source = Arc::new(BbcSearch::new(client.clone(), config.news.clone(), backoff));
        let inference = Arc::new(HuggingFaceClient::new(
            client.clone(),
            config.inference.clone(),
            backoff,
        ));
        let enricher =
            Enricher::from_client(inference, config.inference.topic_entity_groups.clone());
        let translator = Arc::new(GoogleTranslator::new(
            client.clone(),
            config.translation.clone(),
            backoff,
        ));
        let speech = Arc::new(GoogleTts::new(client, config.speech.clone(), backoff));

        info!(
            max_articles = config.news.max_articles,
            language = %config.translation.target_language,
            "Analyzer ready"
        );
        Ok(Self::new(
            source,
            enricher,
            translator,
            speech,
            config.news.max_articles,
            config.translation.target_language.clone(),
        ))
    }

    /// Run the full pipeline for `company`.
    #[instrument(level = "info", skip(self))]
    pub async fn analyze(&self, company: &str) -> AnalysisOutcome {
        let t0 = Instant::now();
        let company = company.trim();

        let articles = self.source.fetch(company, self.max_articles).await;
        if articles.is_empty() {
            warn!("No articles found");
            return AnalysisOutcome::NoArticles(ErrorResponse {
                error: NO_ARTICLES.to_string(),
            });
        }
        info!(count = articles.len(), "Fetched articles");

        let mut enriched = Vec::with_capacity(articles.len());
        for article in &articles {
            enriched.push(self.enricher.enrich(article).await);
        }

        let comparative = analysis::compare(company, &enriched);
        let english = report::compose(company, &comparative);

        let translated_summary = match self.translator.translate(&english, &self.language).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Translation failed; speaking the English report");
                english
            }
        };

        let audio = self
            .speech
            .synthesize(&translated_summary, &self.language, &audio_file_name(company))
            .await
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| TTS_FAILED.to_string());

        info!(
            articles = enriched.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        AnalysisOutcome::Complete(AnalysisResponse {
            company: company.to_string(),
            articles: enriched.iter().map(ArticleReport::from).collect(),
            final_sentiment: comparative.final_sentiment.clone(),
            comparative,
            translated_summary,
            audio,
        })
    }
}

/// `<slug>_sentiment_summary.mp3`, or a generic name for unsluggable input.
pub fn audio_file_name(company: &str) -> String {
    let slug = slugify_title(company);
    if slug.is_empty() {
        "sentiment_summary.mp3".to_string()
    } else {
        format!("{slug}_sentiment_summary.mp3")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use crate::inference::{Entity, EntityRecognizer, SentimentClassifier, Summarizer};
    use crate::models::{Article, Sentiment};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    pub struct FixedSource(pub Vec<Article>);

    #[async_trait]
    impl ArticleSource for FixedSource {
        async fn fetch(&self, _company: &str, max_articles: usize) -> Vec<Article> {
            self.0.iter().take(max_articles).cloned().collect()
        }
    }

    /// Positive when the text mentions "record", negative otherwise.
    pub struct KeywordModel;

    #[async_trait]
    impl Summarizer for KeywordModel {
        async fn summarize(&self, text: &str) -> Result<String> {
            Ok(text.split('.').next().unwrap_or_default().to_string())
        }
    }

    #[async_trait]
    impl SentimentClassifier for KeywordModel {
        async fn classify(&self, text: &str) -> Result<Sentiment> {
            Ok(if text.contains("record") {
                Sentiment::Positive
            } else {
                Sentiment::Negative
            })
        }
    }

    #[async_trait]
    impl EntityRecognizer for KeywordModel {
        async fn entities(&self, text: &str) -> Result<Vec<Entity>> {
            Ok(["Tesla", "Berlin", "SEC"]
                .iter()
                .filter(|w| text.contains(*w))
                .map(|w| Entity {
                    entity_group: "ORG".to_string(),
                    word: w.to_string(),
                    score: 1.0,
                })
                .collect())
        }
    }

    pub struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str, _target: &str) -> Result<String> {
            Err(Error::Translation("offline".to_string()))
        }
    }

    pub struct UpperTranslator;

    #[async_trait]
    impl Translator for UpperTranslator {
        async fn translate(&self, text: &str, _target: &str) -> Result<String> {
            Ok(text.to_uppercase())
        }
    }

    /// Records what it was asked to speak.
    #[derive(Default)]
    pub struct RecordingSpeech {
        pub spoken: Mutex<Vec<(String, String, String)>>,
        pub fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSpeech {
        async fn synthesize(&self, text: &str, language: &str, file_name: &str) -> Option<PathBuf> {
            self.spoken.lock().unwrap().push((
                text.to_string(),
                language.to_string(),
                file_name.to_string(),
            ));
            if self.fail || text.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from("audio").join(file_name))
            }
        }
    }

    pub fn article(title: &str, content: &str) -> Article {
        Article {
            title: title.to_string(),
            url: format!("https://www.bbc.co.uk/news/{}", slugify_title(title)),
            published_at: None,
            content: content.to_string(),
        }
    }

    pub fn analyzer(
        articles: Vec<Article>,
        translator: Arc<dyn Translator>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> NewsAnalyzer {
        NewsAnalyzer::new(
            Arc::new(FixedSource(articles)),
            Enricher::from_client(Arc::new(KeywordModel), vec!["ORG".to_string()]),
            translator,
            speech,
            10,
            "hi",
        )
    }

    #[tokio::test]
    async fn test_no_articles_short_circuits() {
        let speech = Arc::new(RecordingSpeech::default());
        let outcome = analyzer(vec![], Arc::new(UpperTranslator), speech.clone())
            .analyze("Nobody Inc")
            .await;
        assert_eq!(
            outcome,
            AnalysisOutcome::NoArticles(ErrorResponse {
                error: NO_ARTICLES.to_string()
            })
        );
        assert!(speech.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let speech = Arc::new(RecordingSpeech::default());
        let articles = vec![
            article(
                "Tesla posts record deliveries",
                "Tesla posts record deliveries in Berlin. More text follows to pass the threshold.",
            ),
            article(
                "Tesla faces SEC probe",
                "Tesla faces an SEC probe. Regulators are asking about disclosures and filings.",
            ),
            article("Tesla stock slides", "Tesla shares slide."),
        ];
        let outcome = analyzer(articles, Arc::new(UpperTranslator), speech.clone())
            .analyze("  Tesla ")
            .await;

        let AnalysisOutcome::Complete(response) = outcome else {
            panic!("expected a complete analysis");
        };
        assert_eq!(response.company, "Tesla");
        assert_eq!(response.articles.len(), 3);
        assert_eq!(response.articles[0].sentiment, "Positive");
        assert_eq!(response.articles[0].summary, "Tesla posts record deliveries in Berlin");
        assert_eq!(response.articles[1].sentiment, "Negative");
        // Under 50 chars: the content is its own summary.
        assert_eq!(response.articles[2].summary, "Tesla shares slide.");

        let d = response.comparative.distribution;
        assert_eq!((d.positive, d.negative, d.neutral), (1, 2, 0));
        let overlap = response.comparative.topic_overlap.clone().unwrap();
        assert_eq!(overlap.common, vec!["Tesla".to_string()]);
        assert_eq!(overlap.unique_first, vec!["Berlin".to_string()]);
        assert_eq!(overlap.unique_second, vec!["SEC".to_string()]);
        assert!(
            response
                .final_sentiment
                .starts_with("Recent news about Tesla has been mostly negative")
        );
        assert_eq!(response.final_sentiment, response.comparative.final_sentiment);

        assert!(response.translated_summary.starts_with("LATEST NEWS SUMMARY FOR TESLA:"));
        assert_eq!(response.audio, "audio/tesla_sentiment_summary.mp3");

        let spoken = speech.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].1, "hi");
        assert_eq!(spoken[0].0, response.translated_summary);
    }

    #[tokio::test]
    async fn test_translation_and_speech_failures_degrade() {
        let speech = Arc::new(RecordingSpeech {
            fail: true,
            ..Default::default()
        });
        let outcome = analyzer(
            vec![article("Tesla posts record deliveries", "Tesla record.")],
            Arc::new(FailingTranslator),
            speech,
        )
        .analyze("Tesla")
        .await;

        let AnalysisOutcome::Complete(response) = outcome else {
            panic!("expected a complete analysis");
        };
        assert!(response.translated_summary.starts_with("Latest news summary for Tesla:"));
        assert_eq!(response.audio, TTS_FAILED);
        assert!(response.comparative.topic_overlap.is_none());
        assert!(response.comparative.coverage_differences.is_empty());
    }

    #[test]
    fn test_audio_file_name() {
        assert_eq!(audio_file_name("Tata Motors"), "tata-motors_sentiment_summary.mp3");
        assert_eq!(audio_file_name("!!!"), "sentiment_summary.mp3");
    }

    #[test]
    fn test_outcome_serializes_untagged() {
        let outcome = AnalysisOutcome::NoArticles(ErrorResponse {
            error: NO_ARTICLES.to_string(),
        });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "error": NO_ARTICLES }));
    }
}
