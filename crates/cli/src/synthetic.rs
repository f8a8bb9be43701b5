use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use review_core::Review;

pub const DEFAULT_REVIEW_COUNT: usize = 720;
pub const DEFAULT_HOTEL_ID: &str = "HOTEL_001";

const MAX_AGE_DAYS: i64 = 365;

const REVIEWERS: &[&str] = &[
    "Amit", "Rohit", "Sneha", "Pooja", "Rahul", "Ankit", "Neha", "Karan", "Simran", "Vikas",
    "Arjun", "Priya", "Nikhil", "Sonal",
];

const SOURCES: &[&str] = &["google", "booking", "internal"];

const POSITIVE: &[&str] = &[
    "Great stay, rooms were very clean and staff was polite",
    "Excellent hotel with prime location and good amenities",
    "Amazing service, bathroom was spotless",
    "Loved the breakfast buffet and staff behavior",
    "Very comfortable rooms, will definitely visit again",
    "Gym and pool were well maintained",
];

const NEGATIVE: &[&str] = &[
    "Worst stay ever, very dirty rooms",
    "Bad experience, too much noise at night",
    "Poor maintenance and rude staff",
    "Terrible hotel, bathroom smelled bad",
    "Not worth it, rooms were smelly",
    "AC was not working properly",
];

const NEUTRAL: &[&str] = &[
    "Hotel was okay, nothing special",
    "Average stay, decent location",
    "Rooms were fine but service was slow",
    "Okay experience, food was average",
    "Stay was acceptable for one night",
];

const MIXED_LANGUAGE: &[&str] = &[
    "Room clean tha but staff thoda slow tha",
    "Location achi hai but noise zyada tha",
    "Food theek tha, nothing great",
    "Overall stay okay tha",
];

const PRICE: &[&str] = &[
    "I paid 6000 per night",
    "Cost was ₹4500",
    "Tariff was 5200 INR",
    "Price is too high for this hotel",
];
const PHONE: &[&str] = &["Call me at 9876543210", "My number is 9123456789"];
const EMAIL: &[&str] = &["Email me at test@gmail.com", "Contact: demo@yahoo.com"];
const LINK: &[&str] = &["Check www.fakehotel.com", "More details at http://spamlink.com"];
const OWNER: &[&str] = &["Owner Mr Sharma was present", "Manager Ravi handled the issue"];
const ABUSIVE: &[&str] = &["This hotel is shit", "Worst service, staff is stupid"];

/// Applied in order, each independently.
const SNIPPET_POOLS: [(f64, &[&str]); 6] = [
    (0.30, PRICE),
    (0.15, PHONE),
    (0.10, EMAIL),
    (0.10, LINK),
    (0.08, OWNER),
    (0.07, ABUSIVE),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Positive,
    Neutral,
    Negative,
    MixedLanguage,
}

const TONE_WEIGHTS: [(Tone, f64); 4] = [
    (Tone::Positive, 0.35),
    (Tone::Neutral, 0.30),
    (Tone::Negative, 0.25),
    (Tone::MixedLanguage, 0.10),
];

impl Tone {
    fn pick<R: Rng>(rng: &mut R) -> Self {
        TONE_WEIGHTS
            .choose_weighted(rng, |(_, weight)| *weight)
            .map(|(tone, _)| *tone)
            .unwrap_or(Tone::Neutral)
    }

    fn templates(self) -> &'static [&'static str] {
        match self {
            Tone::Positive => POSITIVE,
            Tone::Neutral => NEUTRAL,
            Tone::Negative => NEGATIVE,
            Tone::MixedLanguage => MIXED_LANGUAGE,
        }
    }

    fn rating<R: Rng>(self, rng: &mut R) -> i32 {
        match self {
            Tone::Positive => rng.gen_range(4..=5),
            Tone::Neutral => 3,
            Tone::Negative => rng.gen_range(1..=2),
            Tone::MixedLanguage => rng.gen_range(2..=4),
        }
    }
}

/// Builds a test corpus with a realistic share of reviews that break
/// moderation rules. Ids run `R1..Rn`.
pub fn generate_reviews<R: Rng>(
    rng: &mut R,
    count: usize,
    hotel_id: &str,
    now: DateTime<Utc>,
) -> Vec<Review> {
    (0..count)
        .map(|index| generate_review(rng, index, hotel_id, now))
        .collect()
}

fn generate_review<R: Rng>(
    rng: &mut R,
    index: usize,
    hotel_id: &str,
    now: DateTime<Utc>,
) -> Review {
    let tone = Tone::pick(rng);
    let mut text = pick(rng, tone.templates()).to_string();
    let rating = tone.rating(rng);

    for (probability, snippets) in SNIPPET_POOLS {
        if rng.gen::<f64>() < probability {
            text.push_str(". ");
            text.push_str(pick(rng, snippets));
        }
    }

    let created_at = now - Duration::days(rng.gen_range(0..=MAX_AGE_DAYS));

    Review {
        review_id: Some(format!("R{}", index + 1)),
        hotel_id: hotel_id.to_string(),
        rating,
        review_text: text,
        reviewer_name: Some(pick(rng, REVIEWERS).to_string()),
        source: Some(pick(rng, SOURCES).to_string()),
        created_at: Some(created_at.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string()),
    }
}

fn pick<R: Rng>(rng: &mut R, pool: &'static [&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus(seed: u64, count: usize) -> Vec<Review> {
        let now = Utc::now();
        generate_reviews(&mut StdRng::seed_from_u64(seed), count, DEFAULT_HOTEL_ID, now)
    }

    #[test]
    fn ids_are_sequential_and_records_valid() {
        let reviews = corpus(7, 50);
        assert_eq!(reviews.len(), 50);
        for (index, review) in reviews.iter().enumerate() {
            assert_eq!(review.review_id, Some(format!("R{}", index + 1)));
            assert_eq!(review.hotel_id, DEFAULT_HOTEL_ID);
            assert!(review.validate().is_ok());
            assert!(SOURCES.contains(&review.source.as_deref().unwrap()));
            assert!(REVIEWERS.contains(&review.reviewer_name.as_deref().unwrap()));
        }
    }

    #[test]
    fn same_seed_same_corpus() {
        let now = Utc::now();
        let first = generate_reviews(&mut StdRng::seed_from_u64(42), 30, "H", now);
        let second = generate_reviews(&mut StdRng::seed_from_u64(42), 30, "H", now);
        assert_eq!(first, second);
    }

    #[test]
    fn ratings_follow_template_tone() {
        for review in corpus(3, 200) {
            let base = review.review_text.split(". ").next().unwrap();
            if POSITIVE.contains(&base) {
                assert!((4..=5).contains(&review.rating));
            } else if NEGATIVE.contains(&base) {
                assert!((1..=2).contains(&review.rating));
            } else if NEUTRAL.contains(&base) {
                assert_eq!(review.rating, 3);
            } else {
                assert!(MIXED_LANGUAGE.contains(&base));
                assert!((2..=4).contains(&review.rating));
            }
        }
    }

    #[test]
    fn large_corpus_contains_rule_breaking_snippets() {
        let reviews = corpus(11, DEFAULT_REVIEW_COUNT);
        let with_snippet = reviews
            .iter()
            .filter(|review| review.review_text.contains(". "))
            .count();
        assert!(with_snippet > DEFAULT_REVIEW_COUNT / 4);
        assert!(with_snippet < DEFAULT_REVIEW_COUNT);
    }

    #[test]
    fn every_tone_is_drawn() {
        let mut rng = StdRng::seed_from_u64(9);
        let drawn = (0..500)
            .map(|_| Tone::pick(&mut rng))
            .collect::<Vec<_>>();
        for (tone, _) in TONE_WEIGHTS {
            assert!(drawn.contains(&tone), "{tone:?} never drawn");
        }
        let positive = drawn.iter().filter(|tone| **tone == Tone::Positive).count();
        assert!(positive > drawn.len() / 5);
    }

    #[test]
    fn created_at_is_within_last_year() {
        let now = Utc::now();
        let oldest = (now - Duration::days(MAX_AGE_DAYS + 1)).naive_utc();
        for review in generate_reviews(&mut StdRng::seed_from_u64(5), 40, "H", now) {
            let created = chrono::NaiveDateTime::parse_from_str(
                review.created_at.as_deref().unwrap(),
                "%Y-%m-%dT%H:%M:%S",
            )
            .unwrap();
            assert!(created > oldest);
            assert!(created <= now.naive_utc());
        }
    }
}
