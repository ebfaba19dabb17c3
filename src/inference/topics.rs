//! Topic extraction from named entities, with a keyword fallback.

use super::Entity;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static EV_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bEV\b").expect("valid regex"));
static LAW_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\blaw\b").expect("valid regex"));

/// Entities whose group is in `groups`, as de-duplicated topic strings.
///
/// Word-piece leftovers (`##la`) and blank words are dropped; first-seen
/// order is kept.
pub fn entity_topics(entities: &[Entity], groups: &[String]) -> Vec<String> {
    entities
        .iter()
        .filter(|e| groups.iter().any(|g| g.eq_ignore_ascii_case(&e.entity_group)))
        .map(|e| e.word.trim())
        .filter(|w| !w.is_empty() && !w.starts_with("##"))
        .map(str::to_string)
        .unique()
        .collect()
}

/// Fixed keyword tags used when no entity survived filtering.
pub fn keyword_topics(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let mut topics = Vec::new();

    if lower.contains("electric vehicle") || EV_WORD.is_match(content) {
        topics.push("Electric Vehicles".to_string());
    }
    if lower.contains("stock market") || content.contains("shares") {
        topics.push("Stock Market".to_string());
    }
    if lower.contains("regulation") || LAW_WORD.is_match(content) {
        topics.push("Regulations".to_string());
    }
    if lower.contains("autonomous") || content.contains("self-driving") {
        topics.push("Autonomous Vehicles".to_string());
    }
    topics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(group: &str, word: &str) -> Entity {
        Entity {
            entity_group: group.to_string(),
            word: word.to_string(),
            score: 0.9,
        }
    }

    fn groups() -> Vec<String> {
        vec!["ORG".to_string(), "LOC".to_string()]
    }

    #[test]
    fn test_entity_topics_filters_and_dedupes() {
        let entities = vec![
            entity("ORG", "Tesla"),
            entity("PER", "Elon Musk"),
            entity("LOC", " Berlin "),
            entity("org", "Tesla"),
            entity("ORG", "##la"),
            entity("ORG", "  "),
        ];
        assert_eq!(
            entity_topics(&entities, &groups()),
            vec!["Tesla".to_string(), "Berlin".to_string()]
        );
    }

    #[test]
    fn test_entity_topics_empty() {
        assert!(entity_topics(&[], &groups()).is_empty());
    }

    #[test]
    fn test_keyword_topics_all() {
        let text = "The EV maker's shares climbed as a new law on autonomous driving passed.";
        assert_eq!(
            keyword_topics(text),
            vec![
                "Electric Vehicles".to_string(),
                "Stock Market".to_string(),
                "Regulations".to_string(),
                "Autonomous Vehicles".to_string(),
            ]
        );
    }

    #[test]
    fn test_keyword_topics_word_boundaries() {
        // "EVENT" and "lawn" must not match
        assert!(keyword_topics("An EVENT on the lawn.").is_empty());
    }

    #[test]
    fn test_keyword_topics_case_insensitive_phrases() {
        assert_eq!(
            keyword_topics("Electric Vehicle sales and Stock Market moves"),
            vec!["Electric Vehicles".to_string(), "Stock Market".to_string()]
        );
    }
}
