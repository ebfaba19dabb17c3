//! Crate-wide error type.
//!
//! Every external collaborator (scraper, inference, translation, speech)
//! returns [`Result`]. The pipeline decides which failures degrade to a
//! sentinel and which end the request.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),
}

pub type Result<T> = std::result::Result<T, Error>;
