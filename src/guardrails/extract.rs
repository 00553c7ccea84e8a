use super::cues;
use super::stage::StageRunner;
use super::types::{EntityExtraction, Stage};
use crate::error::Cancelled;
use crate::utils::text::{normalize, words};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const EXTRACT_PROMPT: &str = "List the physical entities the user's goal depends on and the \
candidate actions they are choosing between. Reply with JSON only: \
{\"required_entities\":[\"...\"],\"optional_entities\":[\"...\"],\"options\":[\"<action>\",\"<action>\"]}";

const PREPOSITIONS: &[&str] = &[
    "to", "at", "for", "into", "from", "with", "in", "on", "by", "toward", "towards",
];

const OPTION_PREFIXES: &[&str] = &["should i ", "should we ", "do i ", "i ", "just "];

fn clean_option(raw: &str) -> String {
    let mut option = raw.trim().trim_end_matches(',').trim();
    for prefix in OPTION_PREFIXES {
        if let Some(rest) = option.strip_prefix(prefix) {
            option = rest.trim();
        }
    }
    option.trim_end_matches(" instead").trim().to_string()
}

/// Drop repeats, keeping the first occurrence of each item.
fn dedup_in_order(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

fn has_preposition(option: &str) -> bool {
    words(option).any(|w| PREPOSITIONS.contains(&w))
}

/// Tail of `option` from its first preposition, e.g. "to the car wash".
fn prepositional_tail(option: &str) -> Option<&str> {
    let mut offset = 0;
    for word in option.split(' ') {
        if PREPOSITIONS.contains(&word) {
            return Some(&option[offset..]);
        }
        offset += word.len() + 1;
    }
    None
}

/// Options from the choice pattern, sharing a trailing destination:
/// "walk or drive to the car wash" gives "walk to the car wash" and
/// "drive to the car wash".
pub fn choice_options(text: &str) -> Vec<String> {
    let Some((left, right)) = cues::choice_sides(text) else {
        return Vec::new();
    };
    let mut options: Vec<String> = left
        .split(", ")
        .chain(right.split(" or "))
        .map(clean_option)
        .filter(|o| !o.is_empty())
        .collect();

    if let Some(tail) = options.last().and_then(|last| prepositional_tail(last)).map(str::to_string) {
        for option in &mut options {
            if !has_preposition(option) {
                option.push(' ');
                option.push_str(&tail);
            }
        }
    }
    dedup_in_order(&mut options);
    options
}

/// Deterministic extraction. `None` when fewer than two options are found.
pub fn heuristic_extraction(text: &str) -> Option<EntityExtraction> {
    let normalized = normalize(text);
    let options = choice_options(&normalized);

    let mut required: Vec<String> = Vec::new();
    if let Some(requires) = cues::service_in(&normalized).and_then(|s| s.requires) {
        required.push(requires.to_string());
    }
    for entity in cues::entities_mentioned(&normalized) {
        if !required.iter().any(|r| r == entity) {
            required.push(entity.to_string());
        }
    }
    let mut optional: Vec<String> = Vec::new();
    for option in &options {
        for entity in cues::entities_implied(option) {
            if !required.iter().any(|r| r == entity) && !optional.iter().any(|o| o == entity) {
                optional.push(entity.to_string());
            }
        }
    }

    let extraction = EntityExtraction {
        required_entities: required,
        optional_entities: optional,
        options,
    };
    extraction.has_choice().then_some(extraction)
}

fn tidy_model_extraction(mut extraction: EntityExtraction) -> Result<EntityExtraction, String> {
    for list in [
        &mut extraction.required_entities,
        &mut extraction.optional_entities,
        &mut extraction.options,
    ] {
        for item in list.iter_mut() {
            *item = normalize(item);
        }
        list.retain(|item| !item.is_empty());
        dedup_in_order(list);
    }
    if extraction.has_choice() {
        Ok(extraction)
    } else {
        Err("fewer than two options".into())
    }
}

/// Stage 3. Heuristic first; the model only runs when it finds no choice.
pub async fn extract(
    runner: &StageRunner,
    text: &str,
    budget: Duration,
    cancel: &CancellationToken,
) -> Result<(Option<EntityExtraction>, u32), Cancelled> {
    if let Some(extraction) = heuristic_extraction(text) {
        return Ok((Some(extraction), 0));
    }
    let reply = runner
        .ask_json(
            Stage::EntityExtraction,
            EXTRACT_PROMPT,
            text.to_string(),
            budget,
            cancel,
            tidy_model_extraction,
        )
        .await?;
    let round_trips = reply.round_trips;
    Ok((reply.ok(), round_trips))
}
