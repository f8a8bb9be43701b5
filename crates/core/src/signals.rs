use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::SignalSet;

/// Pattern sources for each signal class. Matched against lower-cased text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalPatterns {
    /// Also matches any bare 4-6 digit number, so room numbers and years trip it.
    pub price: String,
    pub phone: String,
    pub email: String,
    pub link: String,
    pub owner: String,
    pub abusive_words: Vec<String>,
}

impl Default for SignalPatterns {
    fn default() -> Self {
        Self {
            price: r"₹|\b(?:rs|inr)(?:\b|\d)|\b\d{4,6}\b".to_string(),
            phone: r"\b\d{10}\b".to_string(),
            email: r"[a-z0-9_.+-]+@[a-z0-9-]+\.[a-z0-9.-]+".to_string(),
            link: r"https?://|www\.".to_string(),
            owner: r"\b(?:owner|manager)|\bmr\.?\s?[a-z]+".to_string(),
            abusive_words: ["idiot", "stupid", "worst", "shit", "fuck", "bastard"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalDetector {
    price: Regex,
    phone: Regex,
    email: Regex,
    link: Regex,
    owner: Regex,
    abusive: Option<Regex>,
}

impl SignalDetector {
    pub fn new(patterns: &SignalPatterns) -> Result<Self, ConfigError> {
        Ok(Self {
            price: compile("price", &patterns.price)?,
            phone: compile("phone", &patterns.phone)?,
            email: compile("email", &patterns.email)?,
            link: compile("link", &patterns.link)?,
            owner: compile("owner", &patterns.owner)?,
            abusive: word_list_pattern(&patterns.abusive_words)
                .map(|source| compile("abusive", &source))
                .transpose()?,
        })
    }

    pub fn detect(&self, text: &str) -> SignalSet {
        let lower = text.to_lowercase();

        SignalSet {
            price: self.price.is_match(&lower),
            phone: self.phone.is_match(&lower),
            email: self.email.is_match(&lower),
            link: self.link.is_match(&lower),
            abusive: self
                .abusive
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(&lower)),
            owner: self.owner.is_match(&lower),
        }
    }
}

impl Default for SignalDetector {
    fn default() -> Self {
        Self::new(&SignalPatterns::default()).expect("default signal patterns compile")
    }
}

fn compile(name: &'static str, source: &str) -> Result<Regex, ConfigError> {
    Regex::new(source).map_err(|source| ConfigError::InvalidPattern { name, source })
}

fn word_list_pattern(words: &[String]) -> Option<String> {
    let alternatives = words
        .iter()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| !word.is_empty())
        .map(|word| regex::escape(&word))
        .collect::<Vec<_>>();

    if alternatives.is_empty() {
        None
    } else {
        Some(format!("(?:{})", alternatives.join("|")))
    }
}
