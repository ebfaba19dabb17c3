//! Utility functions for string manipulation and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging and for model input limits
//! - Slugification for audio file names
//! - File system validation for the audio output directory

use crate::error::Result;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to roughly `max` bytes (on a char boundary)
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let head = &s[..end];
        format!("{}…(+{} bytes)", head, s.len() - head.len())
    }
}

/// Longest prefix of `s` holding at most `max` chars.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Pack whitespace-separated words into chunks of at most `max` chars.
///
/// Words longer than `max` are split on char boundaries.
pub fn chunk_words(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max).map(|c| c.iter().collect::<String>()));
            continue;
        }
        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Group whole lines into chunks of at most `max` chars, joined by `\n`.
///
/// A single line longer than `max` is broken with [`chunk_words`].
/// Chunks that would be blank are dropped.
pub fn chunk_lines(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut lines: Vec<&str> = Vec::new();
    let mut len = 0usize;

    for line in text.lines() {
        let line_len = line.chars().count();
        if line_len > max {
            push_lines(&mut chunks, &mut lines);
            chunks.extend(chunk_words(line, max));
            continue;
        }
        if !lines.is_empty() && len + 1 + line_len > max {
            push_lines(&mut chunks, &mut lines);
        }
        len = if lines.is_empty() { line_len } else { len + 1 + line_len };
        lines.push(line);
    }
    push_lines(&mut chunks, &mut lines);
    chunks
}

fn push_lines(chunks: &mut Vec<String>, lines: &mut Vec<&str>) {
    let chunk = lines.join("\n");
    lines.clear();
    if !chunk.trim().is_empty() {
        chunks.push(chunk);
    }
}

/// Convert a title to a file-name friendly slug.
///
/// Lowercases the text, removes special characters, and replaces
/// spaces with hyphens.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("Test-Article!"), "test-article");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
