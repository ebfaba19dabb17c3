//! Text-to-speech for the translated report.
//!
//! [`GoogleTts`] uses the public `translate_tts` endpoint, which only accepts
//! short inputs. The text is split on word boundaries, each piece is
//! synthesized separately, and the MP3 segments are concatenated into one
//! file under the configured audio directory.
//!
//! Synthesis never fails the caller: blank input and errors both yield `None`.

use crate::config::SpeechConfig;
use crate::error::{Error, Result};
use crate::retry::Backoff;
use crate::utils::{chunk_words, ensure_writable_dir};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, error, info, instrument};

const TTS_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.51 Safari/537.36";

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` in `language` and save it as `file_name`.
    ///
    /// Returns the written path, or `None` for blank input or any failure.
    async fn synthesize(&self, text: &str, language: &str, file_name: &str) -> Option<PathBuf>;
}

#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: Client,
    config: SpeechConfig,
    backoff: Backoff,
}

impl GoogleTts {
    pub fn new(client: Client, config: SpeechConfig, backoff: Backoff) -> Self {
        Self {
            client,
            config,
            backoff,
        }
    }

    async fn speak_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>> {
        let idx = idx.to_string();
        let total = total.to_string();
        let textlen = chunk.chars().count().to_string();
        let params = [
            ("ie", "UTF-8"),
            ("client", "tw-ob"),
            ("tl", language),
            ("q", chunk),
            ("idx", idx.as_str()),
            ("total", total.as_str()),
            ("textlen", textlen.as_str()),
        ];
        let params = &params;

        self.backoff
            .run("tts", || async move {
                let resp = self
                    .client
                    .get(&self.config.endpoint)
                    .header(USER_AGENT, TTS_USER_AGENT)
                    .query(params)
                    .send()
                    .await?
                    .error_for_status()?;
                let is_audio = resp
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .is_none_or(|ct| ct.starts_with("audio/"));
                if !is_audio {
                    return Err(Error::Speech("service did not return audio".to_string()));
                }
                Ok(resp.bytes().await?.to_vec())
            })
            .await
    }

    async fn try_synthesize(&self, text: &str, language: &str, file_name: &str) -> Result<PathBuf> {
        let chunks = chunk_words(text, self.config.max_chunk_chars);
        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let bytes = self.speak_chunk(chunk, language, i, chunks.len()).await?;
            debug!(index = i, bytes = bytes.len(), "Synthesized chunk");
            audio.extend_from_slice(&bytes);
        }
        if audio.is_empty() {
            return Err(Error::Speech("no audio produced".to_string()));
        }

        ensure_writable_dir(&self.config.audio_dir).await?;
        let path = self.config.audio_dir.join(file_name);
        fs::write(&path, &audio).await?;
        info!(
            path = %path.display(),
            bytes = audio.len(),
            chunks = chunks.len(),
            "Wrote audio file"
        );
        Ok(path)
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    #[instrument(level = "info", skip(self, text), fields(chars = text.chars().count()))]
    async fn synthesize(&self, text: &str, language: &str, file_name: &str) -> Option<PathBuf> {
        if text.trim().is_empty() {
            debug!("Blank text; skipping speech synthesis");
            return None;
        }
        match self.try_synthesize(text, language, file_name).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!(error = %e, "TTS conversion failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tts(audio_dir: PathBuf) -> GoogleTts {
        GoogleTts::new(
            Client::new(),
            SpeechConfig {
                // Nothing listens on the discard port, so requests fail fast.
                endpoint: "http://127.0.0.1:9/translate_tts".to_string(),
                audio_dir,
                max_chunk_chars: 100,
            },
            Backoff::none(),
        )
    }

    #[tokio::test]
    async fn test_empty_text_returns_none() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("audio");
        let synth = tts(dir.clone());
        assert_eq!(synth.synthesize("", "hi", "out.mp3").await, None);
        assert_eq!(synth.synthesize("  \n\t ", "hi", "out.mp3").await, None);
        // Short-circuit happens before the audio directory is touched.
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_unreachable_service_returns_none() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("audio");
        let synth = tts(dir.clone());
        assert_eq!(synth.synthesize("नमस्ते", "hi", "out.mp3").await, None);
        assert!(!dir.join("out.mp3").exists());
    }
}
