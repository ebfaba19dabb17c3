//! Command-line interface definitions for the news sentiment analyzer.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Global options override the YAML configuration; most can also be
//! provided through environment variables.

use crate::config::AppConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the news sentiment analyzer.
///
/// # Examples
///
/// ```sh
/// # Serve the API on the default address
/// news_sentiment serve
///
/// # Analyze one company in-process, speaking Tamil
/// news_sentiment --language ta run "Tata Motors"
///
/// # Query a running API interactively
/// news_sentiment ask --backend-url http://127.0.0.1:8000
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Hugging Face inference API token
    #[arg(long, env = "HF_API_TOKEN", global = true, hide_env_values = true)]
    pub hf_token: Option<String>,

    /// Maximum number of articles to analyze [default: 10]
    #[arg(long, env = "MAX_ARTICLES", global = true)]
    pub max_articles: Option<usize>,

    /// Target language for the translated report [default: hi]
    #[arg(short, long, env = "TARGET_LANGUAGE", global = true)]
    pub language: Option<String>,

    /// Directory for generated MP3 files [default: audio]
    #[arg(long, env = "AUDIO_DIR", global = true)]
    pub audio_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
        bind: String,
    },
    /// Analyze one company in-process and print the result
    Run {
        #[arg(value_parser = company_name)]
        company: String,
    },
    /// Send companies to a running API and show the results
    Ask {
        /// Company to analyze; reads names from stdin when omitted
        #[arg(value_parser = company_name)]
        company: Option<String>,

        /// Root URL of the analysis API
        #[arg(long, env = "BACKEND_URL", default_value = "http://127.0.0.1:8000")]
        backend_url: String,
    },
}

/// Trimmed, non-blank company name.
fn company_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        Err("company name must not be blank".to_string())
    } else {
        Ok(name.to_string())
    }
}

impl Cli {
    /// Layer flag and environment values over `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(token) = &self.hf_token {
            config.inference.api_token = Some(token.clone());
        }
        if let Some(max) = self.max_articles {
            config.news.max_articles = max;
        }
        if let Some(language) = &self.language {
            config.translation.target_language = language.clone();
        }
        if let Some(dir) = &self.audio_dir {
            config.speech.audio_dir = dir.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_default_bind() {
        let cli = Cli::parse_from(["news_sentiment", "serve"]);
        assert_eq!(
            cli.command,
            Command::Serve {
                bind: "127.0.0.1:8000".to_string()
            }
        );
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_run_with_globals() {
        let cli = Cli::parse_from([
            "news_sentiment",
            "run",
            "Tata Motors",
            "--max-articles",
            "3",
            "-l",
            "ta",
            "--config",
            "/tmp/config.yaml",
        ]);
        assert_eq!(
            cli.command,
            Command::Run {
                company: "Tata Motors".to_string()
            }
        );
        assert_eq!(cli.max_articles, Some(3));
        assert_eq!(cli.language.as_deref(), Some("ta"));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yaml")));
    }

    #[test]
    fn test_cli_ask_without_company() {
        let cli = Cli::parse_from([
            "news_sentiment",
            "ask",
            "--backend-url",
            "http://example.com:8000",
        ]);
        assert_eq!(
            cli.command,
            Command::Ask {
                company: None,
                backend_url: "http://example.com:8000".to_string()
            }
        );
    }

    #[test]
    fn test_cli_rejects_blank_company() {
        assert!(Cli::try_parse_from(["news_sentiment", "run", "   "]).is_err());
        assert!(Cli::try_parse_from(["news_sentiment", "run", ""]).is_err());
        assert!(Cli::try_parse_from(["news_sentiment", "ask", " "]).is_err());
        let cli = Cli::parse_from(["news_sentiment", "run", "  Tesla "]);
        assert_eq!(
            cli.command,
            Command::Run {
                company: "Tesla".to_string()
            }
        );
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["news_sentiment"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "news_sentiment",
            "--hf-token",
            "hf_abc",
            "--max-articles",
            "4",
            "--language",
            "mr",
            "--audio-dir",
            "/tmp/out",
            "run",
            "Tesla",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.inference.api_token.as_deref(), Some("hf_abc"));
        assert_eq!(config.news.max_articles, 4);
        assert_eq!(config.translation.target_language, "mr");
        assert_eq!(config.speech.audio_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_apply_overrides_keeps_config_when_absent() {
        let cli = Cli {
            config: None,
            hf_token: None,
            max_articles: None,
            language: None,
            audio_dir: None,
            command: Command::Run {
                company: "Tesla".to_string(),
            },
        };
        let mut config = AppConfig::default();
        config.news.max_articles = 7;
        cli.apply_overrides(&mut config);
        assert_eq!(config.news.max_articles, 7);
        assert_eq!(config.translation.target_language, "hi");
    }
}
