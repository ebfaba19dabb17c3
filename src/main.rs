//! # News Sentiment
//!
//! Fetches recent BBC coverage of a company, summarizes each article,
//! classifies its sentiment and extracts its topics, then compares the
//! coverage and produces a spoken report in a target language.
//!
//! ## Usage
//!
//! ```sh
//! news_sentiment serve --bind 0.0.0.0:8000
//! news_sentiment run Tesla
//! news_sentiment ask Tesla --backend-url http://127.0.0.1:8000
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: search results are walked page by page and each hit is scraped
//! 2. **Enrichment**: summary, sentiment and topics per article via hosted models
//! 3. **Comparison**: sentiment distribution, topic overlap and a final verdict
//! 4. **Report**: composed, translated, and synthesized to MP3

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analysis;
mod cli;
mod client;
mod config;
mod error;
mod inference;
mod models;
mod pipeline;
mod report;
mod retry;
mod scrapers;
mod server;
mod translate;
mod tts;
mod utils;

use cli::{Cli, Command};
use client::{FrontEnd, render};
use config::AppConfig;
use pipeline::NewsAnalyzer;
use server::AppState;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(command = ?args.command, config = ?args.config, "Parsed CLI arguments");

    let mut config = match &args.config {
        Some(path) => AppConfig::from_yaml_file(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to load configuration");
            e
        })?,
        None => AppConfig::default(),
    };
    args.apply_overrides(&mut config);

    match &args.command {
        Command::Serve { bind } => {
            let analyzer = NewsAnalyzer::from_config(&config)?;
            server::run_server(AppState::new(analyzer), bind).await?;
        }
        Command::Run { company } => {
            let start_time = std::time::Instant::now();
            let analyzer = NewsAnalyzer::from_config(&config)?;
            let outcome = analyzer.analyze(company).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            info!(
                elapsed_secs = start_time.elapsed().as_secs_f64(),
                "news_sentiment run complete"
            );
        }
        Command::Ask {
            company,
            backend_url,
        } => {
            let front_end = FrontEnd::new(config.http.client()?, backend_url)?;
            info!(endpoint = %front_end.endpoint(), "Using analysis backend");
            match company {
                Some(company) => {
                    let (data, audio) = front_end.analyze(company).await;
                    println!("{}", render(&data, audio.as_deref()));
                }
                None => front_end.repl().await?,
            }
        }
    }

    Ok(())
}
