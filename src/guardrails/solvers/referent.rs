use super::Solution;
use regex::Regex;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\b").expect("proper name regex"));

static WHO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bwho\b").expect("who regex"));

const PRONOUNS: &[&str] = &["he", "she", "they", "him", "her", "them"];

/// Capitalised words that are not names.
const NOT_NAMES: &[&str] = &[
    "The", "A", "An", "If", "When", "While", "Who", "Whom", "Whose", "What", "Which", "Why", "How",
    "He", "She", "They", "It", "I", "We", "You", "His", "Her", "Their", "My", "Our", "Because",
    "And", "But", "So", "Then", "After", "Before", "Yesterday", "Today", "Tomorrow", "Later",
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "Is", "Was",
    "Did", "Does", "Can", "Could", "Should", "Would", "Please", "Tell", "In", "On", "At",
];

fn names_in(text: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for found in NAME_RE.find_iter(text) {
        let name = found.as_str();
        if !NOT_NAMES.contains(&name) && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

pub fn solve(raw: &str) -> Option<Solution> {
    // ASCII lowercasing keeps byte offsets aligned with `raw`.
    let lowered = raw.to_ascii_lowercase();
    let because_at = lowered.find(" because ")?;
    if !WHO_RE.is_match(&raw[because_at..]) {
        return None;
    }

    let candidates = names_in(&raw[..because_at]);
    let [first, second, ..] = candidates.as_slice() else {
        return None;
    };
    let (first, second) = (*first, *second);

    let clause_start = because_at + " because ".len();
    let clause_end = raw[clause_start..]
        .find(['.', '?', '!', ';'])
        .map_or(raw.len(), |offset| clause_start + offset);
    let clause = raw[clause_start..clause_end].trim();
    let leading = clause.split_whitespace().next()?;
    let leading_lower = leading.to_ascii_lowercase();

    let goal = "identify who the \"because\" clause refers to";
    let constraint = format!("the candidates are {first} and {second}");

    let named: Vec<&str> = names_in(clause)
        .into_iter()
        .filter(|n| *n == first || *n == second)
        .collect();
    let resolved = if leading == first || leading == second {
        Some(leading)
    } else if let [only] = named.as_slice() {
        Some(*only)
    } else {
        None
    };

    if let Some(name) = resolved {
        return Some(Solution::new(
            format!("{name}. The \"because\" clause names {name} explicitly."),
            goal,
            constraint,
            format!("the clause repeats {name}, so the reference is unambiguous"),
        ));
    }

    if PRONOUNS.contains(&leading_lower.as_str()) {
        return Some(Solution::new(
            format!(
                "That can't be determined from the sentence: \"{leading_lower}\" could refer to either {first} or {second}. Which one do you mean?"
            ),
            goal,
            constraint,
            format!("\"{leading_lower}\" fits both candidates, so ask the user to choose"),
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_pronoun_is_ambiguous() {
        let solution =
            solve("Alice told Beth she was late because she overslept. Who overslept?").unwrap();
        assert_eq!(
            solution.answer,
            "That can't be determined from the sentence: \"she\" could refer to either Alice or Beth. Which one do you mean?"
        );
    }

    #[test]
    fn repeated_name_resolves() {
        let solution =
            solve("John thanked Mark because Mark had helped him move. Who helped?").unwrap();
        assert!(solution.answer.starts_with("Mark."));
    }

    #[test]
    fn single_name_inside_clause_resolves() {
        let solution =
            solve("Priya called Tom because the car that Tom borrowed broke down. Who borrowed the car?")
                .unwrap();
        assert!(solution.answer.starts_with("Tom."));
    }

    #[test]
    fn needs_two_names_and_a_question() {
        assert!(solve("Alice left early because she was tired. Who left?").is_none());
        assert!(solve("Alice told Beth she was late because she overslept.").is_none());
    }
}
