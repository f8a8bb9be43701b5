mod keyword;

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use review_core::{ClassificationResult, ModerationConfig};
use tracing::info;

pub use keyword::{KeywordClassifier, KEYWORD_MODEL_NAME, KEYWORD_PROMPT_VERSION};

/// Sentiment, summary and topic extraction behind a swappable backend.
pub trait ContentClassifier: Send + Sync {
    fn model_name(&self) -> &str;
    fn prompt_version(&self) -> &str;
    fn classify(&self, text: &str) -> ClassificationResult;
}

#[derive(Clone)]
pub struct ModelStack {
    pub config: ModerationConfig,
    pub classifier: Arc<dyn ContentClassifier>,
}

impl ModelStack {
    pub fn from_config(config: ModerationConfig) -> Self {
        let classifier: Arc<dyn ContentClassifier> =
            Arc::new(KeywordClassifier::new(config.lexicon.clone()));
        Self { config, classifier }
    }

    pub fn with_classifier(config: ModerationConfig, classifier: Arc<dyn ContentClassifier>) -> Self {
        Self { config, classifier }
    }

    pub fn load_default() -> Result<Self> {
        let config = match env::var("REVIEW_LEXICON_PATH") {
            Ok(path) if !path.trim().is_empty() => {
                let config = ModerationConfig::from_path(&path)
                    .with_context(|| format!("failed loading moderation lexicon from {path}"))?;
                info!(path = %path, "moderation lexicon loaded");
                config
            }
            _ => ModerationConfig::default(),
        };

        Ok(Self::from_config(config))
    }
}

impl Default for ModelStack {
    fn default() -> Self {
        Self::from_config(ModerationConfig::default())
    }
}
