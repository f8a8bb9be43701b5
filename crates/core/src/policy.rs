use crate::config::DEFAULT_MIN_TEXT_CHARS;
use crate::models::{Flag, PublishDecision, RejectionReason, SignalSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyVerdict {
    pub decision: PublishDecision,
    pub rejection_reasons: Vec<RejectionReason>,
    pub special_tags: Vec<&'static str>,
    pub flags: Vec<Flag>,
}

#[derive(Debug, Clone)]
pub struct ModerationPolicy {
    min_text_chars: usize,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_TEXT_CHARS)
    }
}

impl ModerationPolicy {
    pub fn new(min_text_chars: usize) -> Self {
        Self { min_text_chars }
    }

    pub fn evaluate(&self, signals: &SignalSet, text: &str) -> PolicyVerdict {
        let mut rejection_reasons = Vec::new();

        // Evaluation order is part of the output contract.
        let rules = [
            (signals.price, RejectionReason::PriceMentioned),
            (signals.contact(), RejectionReason::ContactInfoMentioned),
            (signals.link, RejectionReason::SpamOrLink),
            (signals.abusive, RejectionReason::AbusiveContent),
            (signals.owner, RejectionReason::OwnerMentioned),
        ];
        for (hit, reason) in rules {
            if hit {
                rejection_reasons.push(reason);
            }
        }

        let mut flags = Vec::new();
        if text.trim().chars().count() < self.min_text_chars {
            flags.push(Flag::TooShort);
        }

        let decision = if rejection_reasons.is_empty() {
            PublishDecision::Publish
        } else {
            PublishDecision::Reject
        };

        PolicyVerdict {
            decision,
            special_tags: rejection_reasons
                .iter()
                .map(|reason| reason.special_tag())
                .collect(),
            rejection_reasons,
            flags,
        }
    }
}
