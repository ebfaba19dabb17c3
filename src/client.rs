//! Interactive front end for a running analysis API.
//!
//! Posts the company name to `/analyze-news/` and renders the JSON result
//! plus the location of the generated audio. Non-200 replies are turned
//! into an `{"error": ...}` object instead of failing the session.

use crate::error::Result;
use crate::models::{CompanyRequest, TTS_FAILED};
use reqwest::Client;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, instrument, warn};
use url::Url;

const ANALYZE_PATH: &str = "analyze-news/";

#[derive(Debug, Clone)]
pub struct FrontEnd {
    client: Client,
    endpoint: Url,
}

impl FrontEnd {
    /// `backend_url` is the API root (`http://127.0.0.1:8000`) or the full
    /// `/analyze-news/` endpoint.
    pub fn new(client: Client, backend_url: &str) -> Result<Self> {
        let mut base = Url::parse(backend_url)?;
        if base.path().trim_end_matches('/').ends_with("analyze-news") {
            if !base.path().ends_with('/') {
                base.set_path(&format!("{}/", base.path()));
            }
            return Ok(Self {
                client,
                endpoint: base,
            });
        }
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            client,
            endpoint: base.join(ANALYZE_PATH)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the backend about `company`; returns the JSON body and the audio path.
    #[instrument(level = "info", skip(self))]
    pub async fn analyze(&self, company: &str) -> (Value, Option<String>) {
        let request = CompanyRequest {
            company_name: company.to_string(),
        };
        let resp = match self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Backend unreachable");
                return (json!({ "error": format!("Failed to reach backend: {e}") }), None);
            }
        };

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return (
                json!({
                    "error": format!("Failed to fetch data. Status Code: {}", status.as_u16())
                }),
                None,
            );
        }

        match resp.json::<Value>().await {
            Ok(data) => {
                let audio = audio_location(&data);
                debug!(has_audio = audio.is_some(), "Received analysis");
                (data, audio)
            }
            Err(e) => (json!({ "error": format!("Invalid response from backend: {e}") }), None),
        }
    }

    /// Read company names from stdin until EOF, printing each result.
    pub async fn repl(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("Enter a company name (e.g. Tesla), or an empty line to quit.");
        while let Some(line) = lines.next_line().await? {
            let company = line.trim();
            if company.is_empty() {
                break;
            }
            let (data, audio) = self.analyze(company).await;
            println!("{}", render(&data, audio.as_deref()));
        }
        Ok(())
    }
}

/// The generated audio path, if synthesis succeeded.
pub fn audio_location(data: &Value) -> Option<String> {
    data.get("Hindi TTS")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != TTS_FAILED)
        .map(str::to_string)
}

pub fn render(data: &Value, audio: Option<&str>) -> String {
    let body = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    match audio {
        Some(path) => format!("{body}\n\nAudio: {path}"),
        None => body,
    }
}
