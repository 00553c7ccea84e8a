//! Deterministic matchers for the router. Every function takes text already
//! passed through [`normalize`](crate::utils::text::normalize).

use super::types::{FollowUp, MemoryWriteKind, RouterContext};
use crate::policy::Intent;
use crate::utils::text::{contains_any, contains_phrase, word_count, words};
use regex::Regex;
use std::sync::LazyLock;

/// Strict for the pre-LLM pass, relaxed for the post-failure fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Relaxed,
}

// ── Literal command prefixes ────────────────────────────────────────────────

const COMMAND_PREFIXES: &[(&str, Intent)] = &[
    ("/search", Intent::WebSearch),
    ("/web", Intent::WebSearch),
    ("/news", Intent::WebSearch),
    ("/browse", Intent::BrowseOnce),
    ("/open", Intent::BrowseOnce),
    ("/remember", Intent::MemoryWrite),
    ("/forget", Intent::MemoryWrite),
    ("/recall", Intent::MemoryRead),
    ("/screen", Intent::ScreenObserve),
    ("/file", Intent::FileTask),
    ("/run", Intent::SystemTask),
    ("/sh", Intent::SystemTask),
    ("/time", Intent::TimeQuery),
    ("/chat", Intent::ChatOnly),
];

pub fn command_prefix(text: &str) -> Option<Intent> {
    let head = text.split_whitespace().next()?;
    COMMAND_PREFIXES
        .iter()
        .find(|(prefix, _)| *prefix == head)
        .map(|(_, intent)| *intent)
}

// ── Follow-ups ──────────────────────────────────────────────────────────────

const SEARCH_FOLLOW_UPS: &[&str] = &[
    "tell me more",
    "more about",
    "more details",
    "the first one",
    "the second one",
    "the third one",
    "the last one",
    "that article",
    "that story",
    "those results",
    "these results",
    "summarize them",
    "summarize those",
    "which of those",
    "which one of those",
    "what about the",
];

const RATIONALE_FOLLOW_UPS: &[&str] = &[
    "why",
    "explain",
    "explain that",
    "explain why",
    "how come",
    "how did you",
    "how do you know",
    "are you sure",
    "what's your reasoning",
    "what is your reasoning",
    "show your reasoning",
    "walk me through",
];

/// Words that may trail a follow-up opener without turning it into a new
/// request.
const REFERENCE_WORDS: &[&str] = &[
    "a", "about", "again", "answer", "article", "decide", "detail", "details", "did", "exactly",
    "first", "get", "it", "last", "link", "me", "more", "now", "of", "on", "one", "ones",
    "please", "really", "result", "results", "second", "so", "story", "that", "the", "them",
    "then", "there", "these", "third", "this", "those", "though", "why", "you",
];

const FOLLOW_UP_MAX_WORDS: usize = 10;

/// The message opens with one of `openers` and nothing after it names a new
/// subject.
fn standalone_reference(text: &str, openers: &[&str]) -> bool {
    openers.iter().any(|opener| {
        text.strip_prefix(opener).is_some_and(|rest| {
            rest.chars().next().is_none_or(|c| !c.is_alphanumeric())
                && words(rest).all(|word| REFERENCE_WORDS.contains(&word))
        })
    })
}

pub fn follow_up(text: &str, ctx: &RouterContext) -> Option<FollowUp> {
    if word_count(text) > FOLLOW_UP_MAX_WORDS {
        return None;
    }
    if ctx.has_recent_rationale && standalone_reference(text, RATIONALE_FOLLOW_UPS) {
        return Some(FollowUp::Rationale);
    }
    if ctx.has_recent_search_results && standalone_reference(text, SEARCH_FOLLOW_UPS) {
        return Some(FollowUp::SearchResults);
    }
    None
}

// ── Screen / file / system / browse / time ──────────────────────────────────

const SCREEN_PHRASES: &[&str] = &[
    "my screen",
    "on screen",
    "the screen",
    "screenshot",
    "screen shot",
    "what am i looking at",
    "what's on my display",
    "read my display",
    "capture my display",
];

pub fn is_screen_request(text: &str) -> bool {
    contains_any(text, SCREEN_PHRASES)
}

static FILE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s'\x22(])(?:~|\.{1,2})?/?(?:[\w.-]+/)*[\w-]+\.(?:txt|md|rs|toml|json|ya?ml|csv|py|js|ts|log|ini|cfg|conf|html|xml|sh)\b")
        .expect("file path regex")
});

const FILE_PHRASES: &[&str] = &[
    "read the file",
    "open the file",
    "read file",
    "open file",
    "write to file",
    "write to the file",
    "save to file",
    "save it to a file",
    "save this to a file",
    "create a file",
    "create a new file",
    "edit the file",
    "append to",
    "list the files",
    "list files",
    "in my documents",
    "this folder",
    "the folder",
    "directory",
];

const FILE_VERBS: &[&str] = &[
    "read", "open", "write", "save", "edit", "create", "append", "show", "summarize", "check",
    "update", "rename", "load",
];

pub fn is_file_request(text: &str) -> bool {
    if contains_any(text, FILE_PHRASES) {
        return true;
    }
    FILE_PATH_RE.is_match(text) && contains_any(text, FILE_VERBS)
}

const SYSTEM_PHRASES: &[&str] = &[
    "run the command",
    "run this command",
    "run a command",
    "execute the command",
    "execute this",
    "in the terminal",
    "in my terminal",
    "in the shell",
    "shell command",
    "terminal command",
    "kill the process",
    "kill process",
    "restart the service",
    "disk usage",
    "free disk space",
    "running processes",
    "cpu usage",
    "memory usage",
];

static COMMAND_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\brun\s+|`)(?:ls|cd|pwd|git|cargo|npm|pip|brew|apt|docker|kubectl|systemctl|ps|top|df|du|grep|cat|chmod|mkdir|rm|curl)\b")
        .expect("command line regex")
});

pub fn is_system_request(text: &str) -> bool {
    contains_any(text, SYSTEM_PHRASES) || COMMAND_LINE_RE.is_match(text)
}

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://\S+|\bwww\.[\w-]+\.\S+|\b[\w-]+\.(?:com|org|net|io|dev|ai|edu|gov|co|app)\b)")
        .expect("url regex")
});

const BROWSE_VERBS: &[&str] = &[
    "open", "go to", "visit", "browse", "navigate", "load", "check", "read", "look at", "pull up",
    "what's on", "what is on", "summarize",
];

pub fn is_browse_request(text: &str) -> bool {
    let Some(found) = URL_RE.find(text) else {
        return false;
    };
    // A bare URL on its own is an implicit "open this".
    found.as_str().len() + 2 >= text.trim().len() || contains_any(text, BROWSE_VERBS)
}

const TIME_PHRASES: &[&str] = &[
    "what time is it",
    "what's the time",
    "what is the time",
    "current time",
    "time is it now",
    "what day is it",
    "what day is today",
    "what's the date",
    "what is the date",
    "today's date",
    "what's today's date",
];

pub fn is_time_query(text: &str) -> bool {
    contains_any(text, TIME_PHRASES) && !contains_phrase(text, " in ")
}

// ── Memory ──────────────────────────────────────────────────────────────────

const MEMORY_REVOKE: &[&str] = &[
    "forget that",
    "forget about",
    "forget my",
    "forget what i",
    "forget everything",
    "i no longer",
    "i don't anymore",
    "stop remembering",
    "delete what you know",
    "remove that from memory",
    "don't remember that",
];

const MEMORY_CORRECT: &[&str] = &[
    "actually i",
    "actually, i",
    "actually my",
    "actually, my",
    "i changed my mind",
    "i've changed my mind",
    "correction:",
    "that's not right, i",
    "that is wrong, i",
    "i meant to say",
    "not anymore, i",
    "update my",
    "i've moved",
    "i moved to",
];

const MEMORY_STORE: &[&str] = &[
    "remember that",
    "remember my",
    "remember this",
    "please remember",
    "don't forget that",
    "do not forget that",
    "keep in mind",
    "note that i",
    "make a note that",
    "save this to memory",
    "store this",
    "for future reference",
    "my name is",
    "call me",
    "my birthday is",
    "i'm allergic to",
    "i am allergic to",
];

static FIRST_PERSON_FACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:my\s+[\w\s']{2,30}?\s+(?:is|are)\s+\w+|i\s+(?:live|work)\s+(?:in|at)\s+\w+|i\s+(?:prefer|love|hate)\s+\w+)")
        .expect("first person fact regex")
});

pub fn memory_write_kind(text: &str, strictness: Strictness) -> Option<MemoryWriteKind> {
    if contains_any(text, MEMORY_REVOKE) {
        return Some(MemoryWriteKind::Revoke);
    }
    if contains_any(text, MEMORY_CORRECT) {
        return Some(MemoryWriteKind::Correct);
    }
    if contains_any(text, MEMORY_STORE) {
        return Some(MemoryWriteKind::Store);
    }
    if strictness == Strictness::Relaxed && !text.contains('?') && FIRST_PERSON_FACT_RE.is_match(text) {
        return Some(MemoryWriteKind::Store);
    }
    None
}

const MEMORY_READ: &[&str] = &[
    "what do you remember",
    "what do you know about me",
    "do you remember",
    "what did i tell you",
    "what have i told you",
    "remind me what i",
    "what's my name",
    "what is my name",
];

pub fn is_memory_read(text: &str) -> bool {
    contains_any(text, MEMORY_READ)
}

// ── Web search ──────────────────────────────────────────────────────────────

const STRONG_SEARCH_PHRASES: &[&str] = &[
    "search for",
    "search the web",
    "search online",
    "web search",
    "look up",
    "lookup",
    "google",
    "find online",
    "find out online",
    "price of",
    "how much is",
    "latest news",
    "breaking news",
    "exchange rate",
    "who won",
];

const REALTIME_TOPICS: &[&str] = &[
    "news", "headlines", "weather", "forecast", "temperature", "stock", "stocks", "shares",
    "market", "crypto", "bitcoin", "ethereum", "btc", "eth", "price", "prices", "score", "scores",
    "game", "match", "election", "polls", "traffic", "flight", "earnings", "release date",
    "trending", "rate", "rates",
];

const REQUEST_FRAMING: &[&str] = &[
    "tell me",
    "give me",
    "show me",
    "can you",
    "could you",
    "would you",
    "i want to know",
    "i'd like to know",
    "let me know",
    "any idea",
];

const ACTION_VERBS: &[&str] = &[
    "check", "find", "get", "fetch", "search", "update me", "pull", "see",
];

const QUESTION_WORDS: &[&str] = &[
    "what", "who", "when", "where", "how", "which", "why", "is", "are", "will", "did", "does",
];

const TEMPORAL_MARKERS: &[&str] = &[
    "today", "tonight", "tomorrow", "yesterday", "now", "right now", "currently", "current",
    "latest", "recent", "recently", "this week", "this weekend", "this morning", "this year",
    "live", "so far",
];

static IDENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:who|what)\s+(?:is|are|was|were)\s+(?:the\s+|a\s+|an\s+)?([\w][\w\s.'-]{1,60}?)\s*\??$")
        .expect("identity regex")
});

const NON_LOOKUP_SUBJECTS: &[&str] = &[
    "you", "your", "yours", "this", "that", "it", "i", "me", "my", "we", "up", "going on",
    "wrong", "better", "the time", "the date", "the difference", "the meaning of life", "love",
];

static ARITHMETIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\s*[-+*/x^%]\s*\d").expect("arithmetic regex"));

fn is_identity_lookup(text: &str) -> bool {
    let Some(caps) = IDENTITY_RE.captures(text) else {
        return false;
    };
    let subject = caps.get(1).map_or("", |m| m.as_str()).trim();
    if subject.is_empty() || ARITHMETIC_RE.is_match(subject) {
        return false;
    }
    let first = words(subject).next().unwrap_or("");
    !NON_LOOKUP_SUBJECTS.contains(&first) && !NON_LOOKUP_SUBJECTS.contains(&subject)
}

fn starts_with_question_word(text: &str) -> bool {
    words(text)
        .next()
        .is_some_and(|first| QUESTION_WORDS.contains(&first))
}

/// Biased toward false positives: an unneeded search is harmless, a missed
/// one sends the turn down the chat path where the model invents tool syntax.
pub fn is_web_search(text: &str, strictness: Strictness) -> bool {
    if is_identity_lookup(text) || contains_any(text, STRONG_SEARCH_PHRASES) {
        return true;
    }
    if !contains_any(text, REALTIME_TOPICS) {
        return false;
    }
    if strictness == Strictness::Relaxed {
        return true;
    }
    text.contains('?')
        || contains_any(text, REQUEST_FRAMING)
        || contains_any(text, ACTION_VERBS)
        || starts_with_question_word(text)
        || contains_any(text, TEMPORAL_MARKERS)
}

// ── Tool sub-intent refinement ──────────────────────────────────────────────

/// Narrow a coarse "tool" classification. `None` leaves the fallback intent.
pub fn refine_tool_intent(text: &str) -> Option<(Intent, Option<MemoryWriteKind>)> {
    if let Some(kind) = memory_write_kind(text, Strictness::Strict) {
        return Some((Intent::MemoryWrite, Some(kind)));
    }
    if is_screen_request(text) {
        return Some((Intent::ScreenObserve, None));
    }
    if is_file_request(text) {
        return Some((Intent::FileTask, None));
    }
    if is_system_request(text) {
        return Some((Intent::SystemTask, None));
    }
    if is_browse_request(text) {
        return Some((Intent::BrowseOnce, None));
    }
    None
}
