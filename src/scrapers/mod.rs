//! News source scrapers for fetching articles about a company.
//!
//! Each source follows the same two-phase pattern:
//!
//! 1. **Searching**: Walk paginated search results for the company name
//! 2. **Fetching**: Download and parse article content from each result
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | BBC News | [`bbc`] | HTML scraping | Site search, paginated |
//!
//! Sources never fail a request outright: network errors and exhausted
//! pagination end the search with whatever was collected so far.

use crate::models::Article;
use async_trait::async_trait;

pub mod bbc;

pub use bbc::BbcSearch;

/// Something that can find articles mentioning a company.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Collect up to `max_articles` articles about `company`.
    ///
    /// Returns an empty vector when nothing was found or the source is
    /// unreachable.
    async fn fetch(&self, company: &str, max_articles: usize) -> Vec<Article>;
}
