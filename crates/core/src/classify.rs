use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::{ClassificationResult, Sentiment, TopicCode};

pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 120;
pub const DEFAULT_TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicKeyword {
    pub keyword: String,
    pub topic: TopicCode,
}

impl TopicKeyword {
    fn new(keyword: &str, topic: TopicCode) -> Self {
        Self {
            keyword: keyword.to_string(),
            topic,
        }
    }
}

/// Word lists and the keyword→topic table used by the rule classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub topic_keywords: Vec<TopicKeyword>,
    pub summary_max_chars: usize,
    pub truncation_marker: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            positive_words: words(&["great", "excellent", "amazing", "clean"]),
            negative_words: words(&["bad", "dirty", "worst", "poor", "noisy"]),
            topic_keywords: vec![
                TopicKeyword::new("clean", TopicCode::Cleanliness),
                TopicKeyword::new("room", TopicCode::RoomQuality),
                TopicKeyword::new("bathroom", TopicCode::Bathroom),
                TopicKeyword::new("breakfast", TopicCode::FoodBreakfast),
                TopicKeyword::new("food", TopicCode::RestaurantFood),
                TopicKeyword::new("staff", TopicCode::ServiceStaff),
                TopicKeyword::new("check", TopicCode::CheckinCheckout),
                TopicKeyword::new("location", TopicCode::Location),
                TopicKeyword::new("pool", TopicCode::Amenities),
                TopicKeyword::new("gym", TopicCode::Amenities),
                TopicKeyword::new("wifi", TopicCode::Wifi),
                TopicKeyword::new("noise", TopicCode::Noise),
                TopicKeyword::new("parking", TopicCode::Parking),
                TopicKeyword::new("safe", TopicCode::SafetySecurity),
                TopicKeyword::new("maintenance", TopicCode::Maintenance),
            ],
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
        }
    }
}

impl Lexicon {
    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        if self.summary_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "summary_max_chars must be greater than zero".to_string(),
            ));
        }

        let blank = self
            .positive_words
            .iter()
            .chain(self.negative_words.iter())
            .chain(self.topic_keywords.iter().map(|entry| &entry.keyword))
            .any(|word| word.trim().is_empty());
        if blank {
            return Err(ConfigError::Invalid(
                "sentiment words and topic keywords must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

pub fn classify_rules(text: &str, lexicon: &Lexicon) -> ClassificationResult {
    let lower = text.to_lowercase();

    ClassificationResult {
        sentiment: detect_sentiment(&lower, lexicon),
        summary: summarize(text, lexicon.summary_max_chars, &lexicon.truncation_marker),
        topics: detect_topics(&lower, lexicon),
    }
}

/// Positive cues win over negative ones when both appear.
pub fn detect_sentiment(lower: &str, lexicon: &Lexicon) -> Sentiment {
    if contains_any(lower, &lexicon.positive_words) {
        Sentiment::Positive
    } else if contains_any(lower, &lexicon.negative_words) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

pub fn summarize(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], marker),
        None => text.to_string(),
    }
}

pub fn detect_topics(lower: &str, lexicon: &Lexicon) -> BTreeSet<TopicCode> {
    lexicon
        .topic_keywords
        .iter()
        .filter(|entry| lower.contains(entry.keyword.to_lowercase().as_str()))
        .map(|entry| entry.topic)
        .collect()
}

fn contains_any(input: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| input.contains(needle.to_lowercase().as_str()))
}

fn words(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}
