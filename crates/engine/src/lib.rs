mod analyzer;
mod service;

pub use analyzer::ReviewAnalyzer;
pub use service::{decode_review, BatchFailure, BatchReport, ReviewService};
