pub mod classify;
pub mod config;
pub mod models;
pub mod policy;
pub mod signals;

pub use classify::{classify_rules, summarize, Lexicon, TopicKeyword};
pub use config::{ConfigError, ModerationConfig};
pub use models::*;
pub use policy::{ModerationPolicy, PolicyVerdict};
pub use signals::{SignalDetector, SignalPatterns};
