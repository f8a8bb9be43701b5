use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::Lexicon;
use crate::signals::SignalPatterns;

pub const DEFAULT_MIN_TEXT_CHARS: usize = 20;

/// Pattern and keyword tables for the whole pipeline. Loaded once at startup
/// and handed to the detector, classifier and policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    pub patterns: SignalPatterns,
    pub lexicon: Lexicon,
    pub min_text_chars: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            patterns: SignalPatterns::default(),
            lexicon: Lexicon::default(),
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

impl ModerationConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.lexicon.check()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} pattern: {source}")]
    InvalidPattern {
        name: &'static str,
        source: regex::Error,
    },
    #[error("failed reading moderation config at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed moderation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid moderation config: {0}")]
    Invalid(String),
}
