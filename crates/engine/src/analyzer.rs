use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use review_core::{
    AnalysisResult, ConfigError, ModerationPolicy, Review, SignalDetector,
};
use review_ml::{ContentClassifier, ModelStack};

/// Turns one review into one verdict. Immutable after construction and safe to
/// share across tasks.
#[derive(Clone)]
pub struct ReviewAnalyzer {
    detector: SignalDetector,
    classifier: Arc<dyn ContentClassifier>,
    policy: ModerationPolicy,
}

impl ReviewAnalyzer {
    pub fn new(
        detector: SignalDetector,
        classifier: Arc<dyn ContentClassifier>,
        policy: ModerationPolicy,
    ) -> Self {
        Self {
            detector,
            classifier,
            policy,
        }
    }

    pub fn from_stack(stack: &ModelStack) -> Result<Self, ConfigError> {
        Ok(Self::new(
            SignalDetector::new(&stack.config.patterns)?,
            stack.classifier.clone(),
            ModerationPolicy::new(stack.config.min_text_chars),
        ))
    }

    pub fn model_name(&self) -> &str {
        self.classifier.model_name()
    }

    pub fn analyze(&self, review: &Review) -> AnalysisResult {
        self.analyze_at(review, Utc::now())
    }

    pub fn analyze_at(&self, review: &Review, analyzed_at: DateTime<Utc>) -> AnalysisResult {
        let text = review.review_text.as_str();

        let signals = self.detector.detect(text);
        let classification = self.classifier.classify(text);
        let verdict = self.policy.evaluate(&signals, text);

        let tags = classification
            .topics
            .iter()
            .map(|topic| topic.as_code())
            .chain(verdict.special_tags.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        AnalysisResult {
            review_id: review.review_id.clone(),
            hotel_id: review.hotel_id.clone(),
            rating: review.rating,
            review_text: review.review_text.clone(),
            publish_decision: verdict.decision,
            rejection_reasons: verdict.rejection_reasons,
            flags: verdict.flags,
            tags,
            sentiment: classification.sentiment,
            summary: classification.summary,
            detected_signals: signals,
            analyzed_at,
            model_name: self.classifier.model_name().to_string(),
            prompt_version: self.classifier.prompt_version().to_string(),
        }
    }
}

impl Default for ReviewAnalyzer {
    fn default() -> Self {
        Self::new(
            SignalDetector::default(),
            ModelStack::default().classifier,
            ModerationPolicy::default(),
        )
    }
}
