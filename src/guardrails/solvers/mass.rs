use super::Solution;
use super::numbers::{NUMBER_WORD_PATTERN, parse_number};
use crate::utils::text::{contains_any, normalize};
use regex::Regex;
use std::sync::LazyLock;

const GRAMS_PER_POUND: f64 = 453.592_37;
const GRAMS_PER_OUNCE: f64 = 28.349_523_125;
const GRAMS_PER_KILOGRAM: f64 = 1000.0;
const RELATIVE_EPSILON: f64 = 1e-6;
const JOINERS: &[&str] = &["or", "vs", "versus"];

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:which|what)\b.*?\b(?:weighs?\s+(?:more|less)|heavier|lighter)\b")
        .expect("mass question regex")
});

static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"\b(?:(?P<digits>\d+(?:[.,]\d+)*)\s*|(?P<words>(?:{NUMBER_WORD_PATTERN})(?:[\s-]+(?:{NUMBER_WORD_PATTERN}))*)\s+)(?P<unit>pounds?|lbs?|ounces?|oz|kilograms?|kilos?|kgs?|grams?|g)\b"
    );
    Regex::new(&pattern).expect("mass quantity regex")
});

static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?!;]|\.(?:\s|$)").expect("sentence end regex"));

#[derive(Debug, Clone, PartialEq)]
struct Quantity {
    label: String,
    grams: f64,
    start: usize,
    end: usize,
}

fn grams_per_unit(unit: &str) -> Option<f64> {
    match unit {
        "pound" | "pounds" | "lb" | "lbs" => Some(GRAMS_PER_POUND),
        "ounce" | "ounces" | "oz" => Some(GRAMS_PER_OUNCE),
        "kilogram" | "kilograms" | "kilo" | "kilos" | "kg" | "kgs" => Some(GRAMS_PER_KILOGRAM),
        "gram" | "grams" | "g" => Some(1.0),
        _ => None,
    }
}

fn quantities(text: &str) -> Vec<Quantity> {
    QUANTITY_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let amount = caps
                .name("digits")
                .or_else(|| caps.name("words"))
                .and_then(|m| parse_number(m.as_str()))?;
            let unit = grams_per_unit(caps.name("unit")?.as_str())?;
            let whole = caps.get(0)?;
            Some(Quantity {
                label: whole.as_str().trim().to_string(),
                grams: amount * unit,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Two decimals, trailing zeros dropped: `907.18`, `900`.
pub(crate) fn format_grams(grams: f64) -> String {
    let fixed = format!("{grams:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Byte range of the sentence holding `start..end`.
fn sentence_around(text: &str, start: usize, end: usize) -> (usize, usize) {
    let mut from = 0;
    let mut to = text.len();
    for boundary in SENTENCE_END_RE.find_iter(text) {
        if boundary.end() <= start {
            from = boundary.end();
        } else if boundary.start() >= end {
            to = boundary.start();
            break;
        }
    }
    (from, to)
}

/// The "A or B" pair of the question's sentence. A sentence naming more
/// than one such pair is ambiguous.
fn operands(
    text: &str,
    question_start: usize,
    question_end: usize,
) -> Option<(Quantity, Quantity)> {
    let (from, to) = sentence_around(text, question_start, question_end);
    let found: Vec<Quantity> = quantities(text)
        .into_iter()
        .filter(|q| q.start >= from && q.end <= to)
        .collect();
    let mut pairs = found
        .windows(2)
        .filter(|pair| contains_any(&text[pair[0].end..pair[1].start], JOINERS));
    let pair = pairs.next()?;
    if pairs.next().is_some() {
        return None;
    }
    Some((pair[0].clone(), pair[1].clone()))
}

fn roughly_equal(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs());
    (a - b).abs() <= RELATIVE_EPSILON * scale
}

pub fn solve(raw: &str) -> Option<Solution> {
    // Same length, so "vs." does not read as a sentence end.
    let text = normalize(raw).replace("vs.", "vs ");
    let question = QUESTION_RE.find(&text)?;
    let asked = question.as_str();
    let asks_lighter = asked.contains("less") || asked.contains("lighter");
    let uses_weigh = asked.contains("weigh");

    let (first, second) = operands(&text, question.start(), question.end())?;
    let (first, second) = (&first, &second);

    let constraint = format!(
        "{} = {} g; {} = {} g",
        first.label,
        format_grams(first.grams),
        second.label,
        format_grams(second.grams)
    );

    if roughly_equal(first.grams, second.grams) {
        return Some(Solution::new(
            "They weigh the same.",
            "compare the two masses",
            constraint,
            format!("both come to {} g", format_grams(first.grams)),
        ));
    }

    let (heavier, lighter) = if first.grams > second.grams {
        (first, second)
    } else {
        (second, first)
    };
    let (pick, verb) = match (asks_lighter, uses_weigh) {
        (false, true) => (heavier, "weighs more"),
        (false, false) => (heavier, "is heavier"),
        (true, true) => (lighter, "weighs less"),
        (true, false) => (lighter, "is lighter"),
    };

    Some(Solution::new(
        format!("{} {verb}.", pick.label),
        "compare the two masses",
        constraint,
        format!(
            "{} g > {} g, so {} {verb}",
            format_grams(heavier.grams),
            format_grams(lighter.grams),
            pick.label
        ),
    ))
}
