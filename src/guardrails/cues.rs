//! Lexicons shared by the trigger, extraction, constraint and evaluation
//! stages. All inputs are normalized text.

use crate::utils::text::{contains_any, contains_phrase, replace_phrase, words};
use regex::Regex;
use std::sync::LazyLock;

/// A place the user goes to get something done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub phrase: &'static str,
    pub goal: &'static str,
    /// Entity that has to be there for the goal to happen.
    pub requires: Option<&'static str>,
}

pub const SERVICES: &[Service] = &[
    Service { phrase: "car wash", goal: "get the car washed", requires: Some("car") },
    Service { phrase: "gas station", goal: "refuel the vehicle", requires: Some("car") },
    Service { phrase: "petrol station", goal: "refuel the vehicle", requires: Some("car") },
    Service { phrase: "oil change", goal: "get the oil changed", requires: Some("car") },
    Service { phrase: "tire shop", goal: "get the tires serviced", requires: Some("car") },
    Service { phrase: "auto shop", goal: "get the car repaired", requires: Some("car") },
    Service { phrase: "mechanic", goal: "get the car repaired", requires: Some("car") },
    Service { phrase: "pharmacy", goal: "pick up the medication", requires: Some("prescription") },
    Service { phrase: "post office", goal: "send the package", requires: Some("package") },
    Service { phrase: "dmv", goal: "handle the license paperwork", requires: Some("id") },
    Service { phrase: "bank", goal: "handle the banking errand", requires: Some("id") },
    Service { phrase: "airport", goal: "catch the flight", requires: Some("ticket") },
    Service { phrase: "locksmith", goal: "get a new key cut", requires: Some("key") },
    Service { phrase: "grocery store", goal: "buy groceries", requires: Some("wallet") },
    Service { phrase: "dry cleaner", goal: "get the clothes cleaned", requires: None },
    Service { phrase: "laundromat", goal: "wash the laundry", requires: None },
    Service { phrase: "library", goal: "return the books", requires: None },
    Service { phrase: "barber", goal: "get a haircut", requires: None },
    Service { phrase: "vet", goal: "get the pet treated", requires: None },
];

/// Canonical entity with its surface aliases and the action phrases that
/// imply it ("drive" implies a car).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityAlias {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub implied_by: &'static [&'static str],
}

pub const ENTITIES: &[EntityAlias] = &[
    EntityAlias {
        canonical: "car",
        aliases: &["car", "vehicle", "truck", "suv", "van"],
        implied_by: &["drive", "driving", "park", "parking"],
    },
    EntityAlias {
        canonical: "id",
        aliases: &["id", "identification", "driver's license", "license", "passport"],
        implied_by: &[],
    },
    EntityAlias {
        canonical: "key",
        aliases: &["key", "keys"],
        implied_by: &["unlock"],
    },
    EntityAlias {
        canonical: "wallet",
        aliases: &["wallet", "cash", "credit card", "debit card", "money"],
        implied_by: &["pay", "buy"],
    },
    EntityAlias {
        canonical: "ticket",
        aliases: &["ticket", "tickets", "boarding pass"],
        implied_by: &[],
    },
    EntityAlias {
        canonical: "prescription",
        aliases: &["prescription", "medication", "medicine"],
        implied_by: &[],
    },
    EntityAlias {
        canonical: "package",
        aliases: &["package", "parcel"],
        implied_by: &["ship", "mail it"],
    },
    EntityAlias {
        canonical: "phone",
        aliases: &["phone", "cellphone", "mobile"],
        implied_by: &["call", "text"],
    },
];

pub const PHYSICAL_CUES: &[&str] = &[
    "go", "going", "bring", "collect", "pay", "in person", "walk", "drive", "take", "carry",
    "visit", "pick up", "head over", "ride", "bike", "cycle",
];

pub const INDIRECT_CUES: &[&str] = &["call", "phone", "text", "email", "message", "ask someone"];

pub const REMOTE_CUES: &[&str] = &[
    "online", "order", "delivery", "deliver", "app", "website", "remotely", "mail", "video",
];

pub const STALL_CUES: &[&str] = &[
    "wait", "later", "tomorrow", "postpone", "skip", "stay home", "do nothing", "delay",
    "next week",
];

pub const COMPLETION_CUES: &[&str] = &[
    "finish", "complete", "done", "fix", "pick up", "drop off", "buy", "return", "wash", "refuel",
    "fill up",
];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "get", "got", "from", "into", "onto", "your", "our", "then",
    "that", "this", "there", "have", "has", "should", "would", "could", "can", "will", "just",
    "over", "out", "off", "all",
];

static CHOICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?:should|shall|would|could|can|do|must)\s+(?:i|we)|is it better to|better to|whether to|whether i should)\s+(?P<a>[^?.!;]+?)\s+or\s+(?P<b>[^?.!;]+)",
    )
    .expect("choice regex")
});

static DISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d+(?:\.\d+)?\s*(?:m|meters?|metres?|km|kilometers?|kilometres?|miles?|mi|feet|ft|yards?|blocks?|minutes?)\b",
    )
    .expect("distance regex")
});

const DISTANCE_PHRASES: &[&str] = &[
    "nearby",
    "next door",
    "around the corner",
    "down the street",
    "across the street",
    "walking distance",
    "close by",
    "far away",
];

pub fn has_choice(text: &str) -> bool {
    CHOICE_RE.is_match(text)
}

/// The two raw sides of the first "X or Y" choice.
pub fn choice_sides(text: &str) -> Option<(&str, &str)> {
    let caps = CHOICE_RE.captures(text)?;
    Some((caps.name("a")?.as_str(), caps.name("b")?.as_str()))
}

pub fn service_in(text: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|s| contains_phrase(text, s.phrase))
}

pub fn has_distance(text: &str) -> bool {
    DISTANCE_RE.is_match(text) || contains_any(text, DISTANCE_PHRASES)
}

/// `text` with every service phrase blanked, so "car wash" does not count
/// as a mention of the car.
pub fn strip_services(text: &str) -> String {
    SERVICES
        .iter()
        .fold(text.to_string(), |acc, s| replace_phrase(&acc, s.phrase, " "))
}

/// Canonical entities whose aliases appear in `text`.
pub fn entities_mentioned(text: &str) -> Vec<&'static str> {
    let stripped = strip_services(text);
    ENTITIES
        .iter()
        .filter(|e| contains_any(&stripped, e.aliases))
        .map(|e| e.canonical)
        .collect()
}

/// Canonical entities an action phrase implies.
pub fn entities_implied(text: &str) -> Vec<&'static str> {
    ENTITIES
        .iter()
        .filter(|e| contains_any(text, e.implied_by))
        .map(|e| e.canonical)
        .collect()
}

pub fn mentions_required_object(text: &str) -> bool {
    !entities_mentioned(text).is_empty()
}

/// Crude stem so "washed" and "wash" compare equal.
fn stem(word: &str) -> &str {
    for suffix in ["ing", "ed", "es", "s"] {
        if word.len() > suffix.len() + 2
            && let Some(stripped) = word.strip_suffix(suffix)
        {
            return stripped;
        }
    }
    word
}

/// Content words of `text`, stemmed.
pub fn meaningful_tokens(text: &str) -> Vec<&str> {
    words(text)
        .filter(|w| w.len() >= 3 && !STOPWORDS.contains(w))
        .map(stem)
        .collect()
}

pub fn shares_token(a: &str, b: &str) -> bool {
    let left = meaningful_tokens(a);
    meaningful_tokens(b).iter().any(|t| left.contains(t))
}
