//! Data models for fetched articles, their enrichment, and the JSON envelope.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: Raw scraped article from the news source
//! - [`EnrichedArticle`]: Article plus summary, sentiment label and topics
//! - [`ComparativeReport`]: Aggregated sentiment counts and topic comparison
//! - [`AnalysisResponse`]: The envelope returned by `POST /analyze-news/`
//!
//! The envelope types rename their fields to the Title Case keys clients
//! of the API already consume ("Comparative Sentiment Score", "Hindi TTS", ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used when an article page has no body we can read.
pub const CONTENT_UNAVAILABLE: &str = "Content unavailable";
/// Sentinel used when summarization fails.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";
/// Sentinel used when sentiment classification fails.
pub const SENTIMENT_UNAVAILABLE: &str = "Sentiment unavailable";
/// Sentinel used when the article page carries no `<time>` element.
pub const DATE_UNAVAILABLE: &str = "Date unavailable";
/// Returned in place of an audio path when speech synthesis produced nothing.
pub const TTS_FAILED: &str = "TTS conversion failed";
/// Error message for a search that yielded nothing.
pub const NO_ARTICLES: &str = "No articles found. Try another company name.";

/// A news article as scraped from the search results.
///
/// Immutable once fetched; every downstream stage reads it by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// The headline shown on the search results page.
    pub title: String,
    /// Absolute URL of the article page.
    pub url: String,
    /// Publication timestamp from the article's `<time datetime>` element.
    pub published_at: Option<DateTime<Utc>>,
    /// Paragraph text of the article body joined by spaces.
    pub content: String,
}

impl Article {
    /// Publication date for display, or [`DATE_UNAVAILABLE`].
    pub fn date_label(&self) -> String {
        self.published_at
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| DATE_UNAVAILABLE.to_string())
    }
}

/// Sentiment label assigned to an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Map a classifier label onto a [`Sentiment`].
    ///
    /// Accepts the plain names in any case (`POSITIVE`, `negative`, ...) and
    /// the `LABEL_0`/`LABEL_1`/`LABEL_2` ids of three-class models, which
    /// are ordered negative, neutral, positive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "pos" | "label_2" => Some(Sentiment::Positive),
            "negative" | "neg" | "label_0" => Some(Sentiment::Negative),
            "neutral" | "neu" | "label_1" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

/// An [`Article`] after summarization, sentiment and topic extraction.
///
/// Derived per request and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedArticle {
    pub article: Article,
    pub summary: String,
    /// `None` when the classifier failed for this article.
    pub sentiment: Option<Sentiment>,
    /// Topics in first-seen order, without duplicates.
    pub topics: Vec<String>,
}

impl EnrichedArticle {
    /// Sentiment for display, or [`SENTIMENT_UNAVAILABLE`].
    pub fn sentiment_label(&self) -> String {
        self.sentiment
            .map(|s| s.to_string())
            .unwrap_or_else(|| SENTIMENT_UNAVAILABLE.to_string())
    }
}

/// Counts of the three sentiment labels across all fetched articles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Topic overlap between the first two articles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicOverlap {
    #[serde(rename = "Common Topics")]
    pub common: Vec<String>,
    #[serde(rename = "Unique Topics in Article 1")]
    pub unique_first: Vec<String>,
    #[serde(rename = "Unique Topics in Article 2")]
    pub unique_second: Vec<String>,
}

/// One comparison sentence with its impact statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDifference {
    #[serde(rename = "Comparison")]
    pub comparison: String,
    #[serde(rename = "Impact")]
    pub impact: String,
}

/// Output of the comparative aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparativeReport {
    #[serde(rename = "Sentiment Distribution")]
    pub distribution: SentimentDistribution,
    #[serde(rename = "Coverage Differences")]
    pub coverage_differences: Vec<CoverageDifference>,
    /// Absent when fewer than two articles were fetched.
    #[serde(rename = "Topic Overlap", skip_serializing_if = "Option::is_none", default)]
    pub topic_overlap: Option<TopicOverlap>,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_sentiment: String,
}

/// Per-article entry of the response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleReport {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Sentiment")]
    pub sentiment: String,
    #[serde(rename = "Topics")]
    pub topics: Vec<String>,
}

impl From<&EnrichedArticle> for ArticleReport {
    fn from(a: &EnrichedArticle) -> Self {
        Self {
            title: a.article.title.clone(),
            summary: a.summary.clone(),
            sentiment: a.sentiment_label(),
            topics: a.topics.clone(),
        }
    }
}

/// Body of `POST /analyze-news/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRequest {
    pub company_name: String,
}

/// Successful response of `POST /analyze-news/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Articles")]
    pub articles: Vec<ArticleReport>,
    #[serde(rename = "Comparative Sentiment Score")]
    pub comparative: ComparativeReport,
    #[serde(rename = "Final Sentiment Analysis")]
    pub final_sentiment: String,
    /// The composed report in the target language (English if translation failed).
    #[serde(rename = "Translated Summary")]
    pub translated_summary: String,
    /// Audio file path, or [`TTS_FAILED`].
    #[serde(rename = "Hindi TTS")]
    pub audio: String,
}

/// `{"error": "..."}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            url: "https://www.bbc.co.uk/news/articles/abc".to_string(),
            published_at: None,
            content: "Body".to_string(),
        }
    }

    #[test]
    fn test_sentiment_from_label() {
        assert_eq!(Sentiment::from_label("POSITIVE"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("negative"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label(" Neutral "), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("LABEL_0"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("LABEL_1"), Some(Sentiment::Neutral));
        assert_eq!(Sentiment::from_label("LABEL_2"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("joy"), None);
    }

    #[test]
    fn test_date_label_missing() {
        assert_eq!(article("t").date_label(), DATE_UNAVAILABLE);
    }

    #[test]
    fn test_article_report_uses_sentinel_for_missing_sentiment() {
        let enriched = EnrichedArticle {
            article: article("Tesla shares rise"),
            summary: "Short".to_string(),
            sentiment: None,
            topics: vec!["Tesla".to_string()],
        };
        let report = ArticleReport::from(&enriched);
        assert_eq!(report.sentiment, SENTIMENT_UNAVAILABLE);
        assert_eq!(report.title, "Tesla shares rise");
    }

    #[test]
    fn test_comparative_report_keys() {
        let report = ComparativeReport {
            distribution: SentimentDistribution {
                positive: 2,
                negative: 1,
                neutral: 0,
            },
            coverage_differences: vec![],
            topic_overlap: None,
            final_sentiment: "Mixed".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["Sentiment Distribution"]["Positive"], 2);
        assert_eq!(json["Sentiment Distribution"]["Negative"], 1);
        assert!(json.get("Topic Overlap").is_none());
        assert_eq!(json["Final Sentiment Analysis"], "Mixed");
    }

    #[test]
    fn test_company_request_deserialization() {
        let req: CompanyRequest = serde_json::from_str(r#"{"company_name": "Tesla"}"#).unwrap();
        assert_eq!(req.company_name, "Tesla");
    }
}
