//! Composes the comparative report into the paragraph that is translated
//! and read aloud.

use crate::models::ComparativeReport;

/// Render `report` as plain text.
///
/// Sentences that already end in terminal punctuation are not given a
/// second full stop.
pub fn compose(company: &str, report: &ComparativeReport) -> String {
    let d = &report.distribution;
    let mut text = format!("Latest news summary for {company}:\n\n");

    text.push_str("Overall Sentiment Distribution:\n");
    text.push_str(&format!("Positive News: {} articles\n", d.positive));
    text.push_str(&format!("Negative News: {} articles\n", d.negative));
    text.push_str(&format!("Neutral News: {} articles\n\n", d.neutral));

    if !report.coverage_differences.is_empty() {
        text.push_str("News Coverage Differences:\n");
        for diff in &report.coverage_differences {
            text.push_str(&format!("- {}\n", sentence(&diff.comparison)));
            text.push_str(&format!("  Impact: {}\n\n", sentence(&diff.impact)));
        }
    }

    text.push_str("Final Sentiment Analysis:\n");
    text.push_str(&sentence(&report.final_sentiment));
    text
}

fn sentence(s: &str) -> String {
    let s = s.trim();
    if s.ends_with(['.', '!', '?']) {
        s.to_string()
    } else {
        format!("{s}.")
    }
}
