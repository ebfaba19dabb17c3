//! Comparative sentiment analysis across the fetched articles.
//!
//! Pure and total over its input: no I/O, no inference calls. The per-article
//! sentiments and topics computed during enrichment are reused as-is.
//!
//! Only the first two articles are compared for topic overlap; articles
//! beyond that contribute to the sentiment distribution alone.

use crate::models::{
    ComparativeReport, CoverageDifference, EnrichedArticle, Sentiment, SentimentDistribution,
    TopicOverlap,
};
use std::collections::HashSet;

/// Tally sentiment labels; unavailable sentiments count toward no bucket.
pub fn sentiment_distribution(articles: &[EnrichedArticle]) -> SentimentDistribution {
    articles
        .iter()
        .filter_map(|a| a.sentiment)
        .fold(SentimentDistribution::default(), |mut d, s| {
            match s {
                Sentiment::Positive => d.positive += 1,
                Sentiment::Negative => d.negative += 1,
                Sentiment::Neutral => d.neutral += 1,
            }
            d
        })
}

/// Intersection and differences of two topic lists.
///
/// `common` and `unique_first` follow the order of `first`; `unique_second`
/// follows the order of `second`. Duplicates are collapsed.
pub fn topic_overlap(first: &[String], second: &[String]) -> TopicOverlap {
    let first_set: HashSet<&str> = first.iter().map(String::as_str).collect();
    let second_set: HashSet<&str> = second.iter().map(String::as_str).collect();

    let ordered = |topics: &[String], keep: &dyn Fn(&str) -> bool| -> Vec<String> {
        let mut seen = HashSet::new();
        topics
            .iter()
            .filter(|t| keep(t.as_str()) && seen.insert(t.as_str()))
            .cloned()
            .collect()
    };

    TopicOverlap {
        common: ordered(first, &|t: &str| second_set.contains(t)),
        unique_first: ordered(first, &|t: &str| !second_set.contains(t)),
        unique_second: ordered(second, &|t: &str| !first_set.contains(t)),
    }
}

/// Impact sentence for the sentiment pair of the first two articles.
///
/// Total over every combination of labels, including unavailable ones,
/// which fall through to the neutral template.
pub fn impact_statement(
    first: Option<Sentiment>,
    second: Option<Sentiment>,
    first_title: &str,
    second_title: &str,
    common_topics: &[String],
) -> String {
    use Sentiment::{Negative, Positive};

    match (first, second) {
        (Some(Positive), Some(Negative)) => format!(
            "While \"{first_title}\" presents an optimistic view, \"{second_title}\" raises concerns, creating a mixed outlook."
        ),
        (Some(Negative), Some(Positive)) => format!(
            "\"{first_title}\" highlights risks, while \"{second_title}\" reassures investors with a positive narrative."
        ),
        (Some(Positive), Some(Positive)) => {
            "Both articles support a strong outlook for the company, reinforcing confidence in the market."
                .to_string()
        }
        (Some(Negative), Some(Negative)) => {
            "Both articles emphasize risks, signaling potential challenges ahead.".to_string()
        }
        _ => format!(
            "\"{first_title}\" and \"{second_title}\" cover different aspects, offering diverse perspectives on {}.",
            join_or(common_topics, "various topics")
        ),
    }
}

/// Overall verdict from the label counts.
pub fn final_sentiment(company: &str, distribution: &SentimentDistribution) -> String {
    let SentimentDistribution {
        positive,
        negative,
        neutral,
    } = *distribution;

    if distribution.total() == 0 {
        format!("No sentiment analysis available for {company} at this time.")
    } else if positive > negative && positive > neutral {
        format!(
            "{company} is receiving mostly positive coverage, indicating potential investor confidence and growth opportunities."
        )
    } else if negative > positive && negative > neutral {
        format!(
            "Recent news about {company} has been mostly negative, suggesting challenges that could impact its market position."
        )
    } else if neutral > positive && neutral > negative {
        format!(
            "Coverage on {company} remains mostly neutral, reflecting a balanced perspective without strong positive or negative sentiment."
        )
    } else {
        format!(
            "Mixed sentiment exists for {company}. Some reports highlight growth, while others raise concerns."
        )
    }
}

/// Build the comparative report for `company`.
pub fn compare(company: &str, articles: &[EnrichedArticle]) -> ComparativeReport {
    let distribution = sentiment_distribution(articles);
    let final_sentiment = final_sentiment(company, &distribution);

    let (coverage_differences, topic_overlap) = match articles {
        [first, second, ..] => {
            let overlap = topic_overlap(&first.topics, &second.topics);
            let differences = coverage_differences(first, second, &overlap);
            (differences, Some(overlap))
        }
        _ => (Vec::new(), None),
    };

    ComparativeReport {
        distribution,
        coverage_differences,
        topic_overlap,
        final_sentiment,
    }
}

fn coverage_differences(
    first: &EnrichedArticle,
    second: &EnrichedArticle,
    overlap: &TopicOverlap,
) -> Vec<CoverageDifference> {
    let first_title = &first.article.title;
    let second_title = &second.article.title;

    vec![
        CoverageDifference {
            comparison: format!(
                "Article 1 highlights '{first_title}', while Article 2 discusses '{second_title}'."
            ),
            impact: impact_statement(
                first.sentiment,
                second.sentiment,
                first_title,
                second_title,
                &overlap.common,
            ),
        },
        CoverageDifference {
            comparison: format!(
                "Article 1 focuses on {}, whereas Article 2 is about {}.",
                join_or(&first.topics, "no specific topics"),
                join_or(&second.topics, "no specific topics")
            ),
            impact: format!(
                "Common themes include {}, but Article 1 uniquely covers {}, while Article 2 focuses on {}.",
                join_or(&overlap.common, "none"),
                join_or(&overlap.unique_first, "no additional topics"),
                join_or(&overlap.unique_second, "no additional topics")
            ),
        },
    ]
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}
