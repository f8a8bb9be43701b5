use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub review_id: Option<String>,
    pub hotel_id: String,
    pub rating: i32,
    pub review_text: String,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Review {
    pub fn new(hotel_id: impl Into<String>, rating: i32, review_text: impl Into<String>) -> Self {
        Self {
            review_id: None,
            hotel_id: hotel_id.into(),
            rating,
            review_text: review_text.into(),
            reviewer_name: None,
            source: None,
            created_at: None,
        }
    }

    pub fn with_id(mut self, review_id: impl Into<String>) -> Self {
        self.review_id = Some(review_id.into());
        self
    }

    /// Caller-side contract check. The analyzer itself only reads `review_text`.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.hotel_id.trim().is_empty() {
            return Err(ReviewError::MissingHotelId);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewError::RatingOutOfRange(self.rating));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("hotel_id must not be blank")]
    MissingHotelId,
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    pub price: bool,
    pub phone: bool,
    pub email: bool,
    pub link: bool,
    pub abusive: bool,
    pub owner: bool,
}

impl SignalSet {
    pub fn contact(&self) -> bool {
        self.phone || self.email
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "SENTIMENT_POSITIVE")]
    Positive,
    #[serde(rename = "SENTIMENT_NEGATIVE")]
    Negative,
    #[serde(rename = "SENTIMENT_NEUTRAL")]
    Neutral,
}

impl Sentiment {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Positive => "SENTIMENT_POSITIVE",
            Self::Negative => "SENTIMENT_NEGATIVE",
            Self::Neutral => "SENTIMENT_NEUTRAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopicCode {
    Cleanliness,
    RoomQuality,
    Bathroom,
    FoodBreakfast,
    RestaurantFood,
    ServiceStaff,
    CheckinCheckout,
    Location,
    Amenities,
    Wifi,
    Noise,
    Parking,
    SafetySecurity,
    Maintenance,
}

impl TopicCode {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Cleanliness => "CLEANLINESS",
            Self::RoomQuality => "ROOM_QUALITY",
            Self::Bathroom => "BATHROOM",
            Self::FoodBreakfast => "FOOD_BREAKFAST",
            Self::RestaurantFood => "RESTAURANT_FOOD",
            Self::ServiceStaff => "SERVICE_STAFF",
            Self::CheckinCheckout => "CHECKIN_CHECKOUT",
            Self::Location => "LOCATION",
            Self::Amenities => "AMENITIES",
            Self::Wifi => "WIFI",
            Self::Noise => "NOISE",
            Self::Parking => "PARKING",
            Self::SafetySecurity => "SAFETY_SECURITY",
            Self::Maintenance => "MAINTENANCE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishDecision {
    Publish,
    Reject,
}

impl PublishDecision {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Publish => "PUBLISH",
            Self::Reject => "REJECT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    PriceMentioned,
    ContactInfoMentioned,
    SpamOrLink,
    AbusiveContent,
    OwnerMentioned,
}

impl RejectionReason {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::PriceMentioned => "PRICE_MENTIONED",
            Self::ContactInfoMentioned => "CONTACT_INFO_MENTIONED",
            Self::SpamOrLink => "SPAM_OR_LINK",
            Self::AbusiveContent => "ABUSIVE_CONTENT",
            Self::OwnerMentioned => "OWNER_MENTIONED",
        }
    }

    /// Tag attached alongside the reason. Links are tagged as spam suspects.
    pub fn special_tag(self) -> &'static str {
        match self {
            Self::SpamOrLink => "SPAM_SUSPECT",
            other => other.as_code(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flag {
    TooShort,
}

impl Flag {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::TooShort => "TOO_SHORT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub sentiment: Sentiment,
    pub summary: String,
    pub topics: std::collections::BTreeSet<TopicCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub review_id: Option<String>,
    pub hotel_id: String,
    pub rating: i32,
    pub review_text: String,
    pub publish_decision: PublishDecision,
    pub rejection_reasons: Vec<RejectionReason>,
    pub flags: Vec<Flag>,
    pub tags: Vec<String>,
    pub sentiment: Sentiment,
    pub summary: String,
    pub detected_signals: SignalSet,
    pub analyzed_at: DateTime<Utc>,
    pub model_name: String,
    pub prompt_version: String,
}

impl AnalysisResult {
    pub fn is_published(&self) -> bool {
        self.publish_decision == PublishDecision::Publish
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_deserializes_without_optional_metadata() {
        let review: Review = serde_json::from_str(
            r#"{"hotel_id":"HOTEL_001","rating":4,"review_text":"Nice stay"}"#,
        )
        .expect("review parses");
        assert_eq!(review.review_id, None);
        assert!(review.validate().is_ok());
    }

    #[test]
    fn review_without_hotel_id_fails_to_decode() {
        let parsed = serde_json::from_str::<Review>(r#"{"rating":4,"review_text":"Nice"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_rating() {
        let review = Review::new("HOTEL_001", 9, "text");
        assert_eq!(review.validate(), Err(ReviewError::RatingOutOfRange(9)));
        let review = Review::new("  ", 3, "text");
        assert_eq!(review.validate(), Err(ReviewError::MissingHotelId));
    }

    #[test]
    fn codes_match_wire_format() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Positive).unwrap(),
            "\"SENTIMENT_POSITIVE\""
        );
        assert_eq!(
            serde_json::to_string(&TopicCode::CheckinCheckout).unwrap(),
            "\"CHECKIN_CHECKOUT\""
        );
        assert_eq!(
            serde_json::to_string(&RejectionReason::SpamOrLink).unwrap(),
            "\"SPAM_OR_LINK\""
        );
        assert_eq!(RejectionReason::SpamOrLink.special_tag(), "SPAM_SUSPECT");
        assert_eq!(Flag::TooShort.as_code(), "TOO_SHORT");
    }
}
