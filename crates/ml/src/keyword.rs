use review_core::{classify_rules, ClassificationResult, Lexicon};

use crate::ContentClassifier;

pub const KEYWORD_MODEL_NAME: &str = "mock-llm-v1";
pub const KEYWORD_PROMPT_VERSION: &str = "v1.0";

/// Deterministic stand-in for a language-model call.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    lexicon: Lexicon,
}

impl KeywordClassifier {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }
}

impl ContentClassifier for KeywordClassifier {
    fn model_name(&self) -> &str {
        KEYWORD_MODEL_NAME
    }

    fn prompt_version(&self) -> &str {
        KEYWORD_PROMPT_VERSION
    }

    fn classify(&self, text: &str) -> ClassificationResult {
        classify_rules(text, &self.lexicon)
    }
}
