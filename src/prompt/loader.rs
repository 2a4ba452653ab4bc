//! Loading practice prompts from JSON.
//!
//! A prompt file is an array of `{"text": ..., "kana": ...}` records and only
//! the first record is used. Any failure is logged and replaced by a
//! placeholder prompt, so callers always get something to display.

use crate::models::Prompt;
use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(RustEmbed)]
#[folder = "resources/"]
struct Asset;

const BUNDLED_PROMPTS: &str = "prompts/default.json";

/// Shown in place of the prompt when loading fails.
pub const PLACEHOLDER_TEXT: &str = "お題読み込み失敗";

pub fn placeholder() -> Prompt {
    Prompt::new(PLACEHOLDER_TEXT, "")
}

/// Loads the first prompt from `path`, or from the bundled set when no path
/// is given.
pub fn load(path: Option<&Path>) -> Prompt {
    match path {
        Some(path) => load_first(path),
        None => load_bundled(),
    }
}

pub fn load_first(path: &Path) -> Prompt {
    match read_first(path) {
        Ok(prompt) => {
            info!(path = %path.display(), "loaded prompt");
            prompt
        }
        Err(err) => {
            warn!(?err, path = %path.display(), "failed to load prompt; using placeholder");
            placeholder()
        }
    }
}

pub fn load_bundled() -> Prompt {
    let parsed = Asset::get(BUNDLED_PROMPTS)
        .context(format!("Could not find embedded prompt file: {}", BUNDLED_PROMPTS))
        .and_then(|file| {
            let raw = std::str::from_utf8(file.data.as_ref())?;
            parse_first(raw)
        });

    parsed.unwrap_or_else(|err| {
        warn!(?err, "failed to load bundled prompts; using placeholder");
        placeholder()
    })
}

fn read_first(path: &Path) -> Result<Prompt> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read prompt file {}", path.display()))?;
    parse_first(&raw)
}

/// Parses only the first record, so a bad record later in the file does not
/// hide a usable first prompt.
pub fn parse_first(raw: &str) -> Result<Prompt> {
    let records: Vec<serde_json::Value> =
        serde_json::from_str(raw).context("prompt file is not a JSON array")?;
    let first = records
        .into_iter()
        .next()
        .context("prompt file holds no records")?;
    serde_json::from_value(first).context("first prompt record is not a {text, kana} object")
}
