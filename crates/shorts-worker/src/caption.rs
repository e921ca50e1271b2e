//! Caption and hashtag synthesis from provider tags.

use std::collections::BTreeSet;

use rand::seq::{index, IndexedRandom};
use rand::Rng;

use shorts_models::{Caption, MAX_HASHTAGS};

/// Subject used when the provider gave no tags.
const DEFAULT_SUBJECT: &str = "Nature";

/// Title templates; `{}` is replaced by the subject.
const TITLE_TEMPLATES: &[&str] = &[
    "{} Vibes 🌿",
    "A Moment of {} 🍃",
    "Pure {} Calm ✨",
    "Daily Dose of {} 🌎",
    "{} Therapy 🌱",
    "Breathe In: {} 🌤️",
];

/// Always mixed into the hashtag pool.
const CURATED_HASHTAGS: &[&str] = &[
    "#nature",
    "#naturelovers",
    "#naturevibes",
    "#shorts",
    "#relaxing",
    "#calm",
    "#peaceful",
    "#outdoors",
    "#earth",
    "#ambient",
];

/// Split a comma-separated tag string into trimmed, non-empty tags.
pub fn split_tags(tags: &str) -> Vec<&str> {
    tags.split(',').map(str::trim).filter(|t| !t.is_empty()).collect()
}

/// Capitalise each whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `#` + lowercase alphanumeric form of a tag, or `None` if nothing is left.
pub fn hashtag_for(tag: &str) -> Option<String> {
    let body: String = tag
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    if body.is_empty() {
        None
    } else {
        Some(format!("#{}", body))
    }
}

/// Tag-derived hashtags united with the curated list, in sorted order.
pub fn hashtag_pool(tags: &[&str]) -> BTreeSet<String> {
    tags.iter()
        .filter_map(|tag| hashtag_for(tag))
        .chain(CURATED_HASHTAGS.iter().map(|h| h.to_string()))
        .collect()
}

/// Builds captions. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionGenerator;

impl CaptionGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate<R>(&self, tags: Option<&str>, rng: &mut R) -> Caption
    where
        R: Rng + ?Sized,
    {
        let raw = tags.map(str::trim).filter(|t| !t.is_empty()).unwrap_or("nature");
        let tags = split_tags(raw);

        let subject = tags
            .first()
            .map(|t| title_case(t))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let template = TITLE_TEMPLATES.choose(rng).copied().unwrap_or("{}");
        let title = template.replace("{}", &subject);

        let pool: Vec<String> = hashtag_pool(&tags).into_iter().collect();
        let amount = pool.len().min(MAX_HASHTAGS);
        let hashtags = index::sample(rng, pool.len(), amount)
            .into_iter()
            .map(|i| pool[i].clone())
            .collect();

        Caption { title, hashtags }
    }
}
