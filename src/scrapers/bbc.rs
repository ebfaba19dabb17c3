//! BBC News search scraper.
//!
//! Walks `https://www.bbc.co.uk/search?q=<company>&page=<n>`, follows the
//! promo link of every result and reads the article body and publication
//! time from the article page.
//!
//! The BBC's class names carry build hashes (`ssrcss-1imfos9-PageStack`),
//! so selectors match on the stable suffix only.

use super::ArticleSource;
use crate::config::NewsConfig;
use crate::error::{Error, Result};
use crate::models::{Article, CONTENT_UNAVAILABLE};
use crate::retry::Backoff;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use rand::{Rng, rng};
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Hard stop for pagination in case the site keeps serving result pages.
const MAX_PAGES: usize = 25;

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.51 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
];

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div[class*="PageStack"]"#).expect("valid selector"));
static PROMO_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[class*="PromoLink"][href]"#).expect("valid selector"));
static ARTICLE_WRAPPER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"article[class*="ArticleWrapper"]"#).expect("valid selector"));
static ARTICLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article").expect("valid selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid selector"));
static TIME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("time[datetime]").expect("valid selector"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A title and absolute link taken from a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Parse one search results page.
///
/// Returns `None` when the page has no result containers, which marks the
/// end of pagination. Containers without a promo link are skipped.
pub fn parse_search_page(html: &str, base: &Url) -> Option<Vec<SearchHit>> {
    let document = Html::parse_document(html);
    let containers: Vec<ElementRef> = document.select(&RESULT_SELECTOR).collect();
    if containers.is_empty() {
        return None;
    }

    let mut seen = HashSet::new();
    let mut hits = Vec::new();
    for container in containers {
        let Some(link) = container.select(&PROMO_LINK_SELECTOR).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            debug!(%href, "Unresolvable result link");
            continue;
        };
        let title = collapse_text(link);
        if title.is_empty() {
            continue;
        }
        let url = resolved.to_string();
        // Containers nest, so the same link can be reached twice.
        if seen.insert(url.clone()) {
            hits.push(SearchHit { title, url });
        }
    }
    Some(hits)
}

/// Parse an article page into its body text and publication time.
///
/// Paragraphs are read from the article wrapper (or any `<article>` when the
/// wrapper is missing) and joined with single spaces. A page without
/// paragraphs yields [`CONTENT_UNAVAILABLE`].
pub fn parse_article_page(html: &str) -> (String, Option<DateTime<Utc>>) {
    let document = Html::parse_document(html);

    let body = document
        .select(&ARTICLE_WRAPPER_SELECTOR)
        .next()
        .or_else(|| document.select(&ARTICLE_SELECTOR).next());

    let content = body
        .map(|article| {
            article
                .select(&PARAGRAPH_SELECTOR)
                .map(collapse_text)
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| CONTENT_UNAVAILABLE.to_string());

    let published_at = document
        .select(&TIME_SELECTOR)
        .next()
        .and_then(|t| t.value().attr("datetime"))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|d| d.with_timezone(&Utc));

    (content, published_at)
}

fn collapse_text(element: ElementRef) -> String {
    let raw = element.text().collect::<String>();
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

/// BBC News site search.
#[derive(Debug, Clone)]
pub struct BbcSearch {
    client: Client,
    config: NewsConfig,
    backoff: Backoff,
}

impl BbcSearch {
    pub fn new(client: Client, config: NewsConfig, backoff: Backoff) -> Self {
        Self {
            client,
            config,
            backoff,
        }
    }

    /// URL of one search results page.
    pub fn search_url(&self, company: &str, page: usize) -> String {
        format!(
            "{}?q={}&page={}",
            self.config.search_url,
            urlencoding::encode(company.trim()),
            page
        )
    }

    #[instrument(level = "debug", skip(self, user_agent))]
    async fn get_html(&self, url: &str, user_agent: &str) -> Result<String> {
        let referer = format!("{}/", self.config.site_url.trim_end_matches('/'));
        self.backoff
            .run("bbc.get", || {
                let referer = referer.clone();
                async move {
                    let resp = self
                        .client
                        .get(url)
                        .header(USER_AGENT, user_agent)
                        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                        .header(REFERER, referer)
                        .send()
                        .await?
                        .error_for_status()?;
                    Ok(resp.text().await?)
                }
            })
            .await
    }

    /// Fetch a single article page.
    #[instrument(level = "info", skip_all, fields(url = %hit.url))]
    async fn fetch_article(&self, hit: &SearchHit, user_agent: &str) -> Result<Article> {
        let html = self.get_html(&hit.url, user_agent).await?;
        let (content, published_at) = parse_article_page(&html);
        let article = Article {
            title: hit.title.clone(),
            url: hit.url.clone(),
            published_at,
            content,
        };
        info!(
            bytes = article.content.len(),
            date = %article.date_label(),
            "Parsed BBC article"
        );
        Ok(article)
    }

    fn page_delay(&self) -> Duration {
        let lo = self.config.page_delay_min_ms;
        let hi = self.config.page_delay_max_ms.max(lo);
        Duration::from_millis(rng().random_range(lo..=hi))
    }
}

#[async_trait]
impl ArticleSource for BbcSearch {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, company: &str, max_articles: usize) -> Vec<Article> {
        let base = match Url::parse(&self.config.site_url) {
            Ok(base) => base,
            Err(e) => {
                error!(
                    error = %Error::from(e),
                    site_url = %self.config.site_url,
                    "Invalid site URL"
                );
                return Vec::new();
            }
        };
        let user_agent: &'static str = USER_AGENTS
            .choose(&mut rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let mut articles: Vec<Article> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 1..=MAX_PAGES {
            if articles.len() >= max_articles {
                break;
            }
            let page_url = self.search_url(company, page);
            let html = match self.get_html(&page_url, user_agent).await {
                Ok(html) => html,
                Err(e) => {
                    error!(page, error = %e, "Search page fetch failed; stopping");
                    break;
                }
            };

            let Some(hits) = parse_search_page(&html, &base) else {
                info!(page, "No more articles found");
                break;
            };
            let fresh: Vec<SearchHit> = hits
                .into_iter()
                .filter(|hit| seen.insert(hit.url.clone()))
                .collect();
            if fresh.is_empty() {
                info!(page, "Search page repeated earlier results; stopping");
                break;
            }
            debug!(page, count = fresh.len(), "Indexed BBC search results");

            // Failed pages must not use up a slot, so cap after filtering.
            let remaining = max_articles - articles.len();
            let fetched: Vec<Article> = stream::iter(fresh)
                .then(|hit: SearchHit| async move {
                    match self.fetch_article(&hit, user_agent).await {
                        Ok(article) => Some(article),
                        Err(e) => {
                            warn!(error = %e, url = %hit.url, "Skipped article");
                            None
                        }
                    }
                })
                .filter_map(std::future::ready)
                .take(remaining)
                .collect()
                .await;
            articles.extend(fetched);

            if articles.len() < max_articles {
                sleep(self.page_delay()).await;
            }
        }

        if articles.is_empty() {
            warn!("No articles found. Try adjusting the search term or source.");
        }
        info!(count = articles.len(), "Fetched BBC articles");
        articles
    }
}
