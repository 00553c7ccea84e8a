use super::Solution;
use crate::utils::text::{contains_any, contains_phrase, normalize};
use regex::Regex;
use std::sync::LazyLock;

const PHOTO_CUES: &[&str] = &["photo", "photograph", "picture", "portrait", "painting"];

const ONLY_CHILD_ANCHORS: &[&str] = &[
    "brothers and sisters i have none",
    "brothers and sisters, i have none",
    "i have no brothers",
    "i have no sisters",
    "i have no siblings",
    "i don't have any siblings",
    "i don't have siblings",
    "i am an only child",
    "i'm an only child",
];

static NESTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:that|this|the) (?P<subject>man|woman|boy|girl|person)'s (?P<relation>father|mother) is my (?P<parent>father|mother)'s (?P<only>only )?(?P<child>son|daughter|child)\b",
    )
    .expect("nested relation regex")
});

static STATED_GENDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bi(?:'m| am) (?:a )?(?P<gender>man|woman|male|female|boy|girl|guy|lady)\b")
        .expect("stated gender regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gender {
    Male,
    Female,
}

impl Gender {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "man" | "male" | "boy" | "guy" | "son" | "father" => Some(Self::Male),
            "woman" | "female" | "girl" | "lady" | "daughter" | "mother" => Some(Self::Female),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

fn child_term(subject: &str) -> &'static str {
    match Gender::from_word(subject) {
        Some(Gender::Male) => "son",
        Some(Gender::Female) => "daughter",
        None => "child",
    }
}

pub fn solve(raw: &str) -> Option<Solution> {
    let text = normalize(raw);
    if !contains_any(&text, PHOTO_CUES) || !contains_phrase(&text, "who") {
        return None;
    }
    let caps = NESTED_RE.captures(&text)?;
    let subject = caps.name("subject")?.as_str();
    let relation = caps.name("relation")?.as_str();
    let parent = caps.name("parent")?.as_str();
    let child = caps.name("child")?.as_str();
    let only = caps.name("only").is_some();
    if !only && !contains_any(&text, ONLY_CHILD_ANCHORS) {
        return None;
    }

    let self_reference = format!("my {parent}'s {child}");
    let goal = "identify who is in the photograph";
    let constraint = format!("the speaker has no siblings, so \"{self_reference}\" is the speaker");

    let by_child = Gender::from_word(child);
    let by_relation = Gender::from_word(relation);
    if let (Some(a), Some(b)) = (by_child, by_relation)
        && a != b
    {
        return Some(Solution::new(
            format!(
                "The clues are inconsistent: \"{self_reference}\" makes the speaker {}, but the speaker is also the {subject}'s {relation}.",
                a.label()
            ),
            goal,
            constraint,
            "the two clauses imply different genders for the speaker",
        ));
    }

    let implied = by_child.or(by_relation);
    let stated = STATED_GENDER_RE
        .captures(&text)
        .and_then(|c| c.name("gender"))
        .and_then(|m| Gender::from_word(m.as_str()));
    if let (Some(implied), Some(stated)) = (implied, stated)
        && implied != stated
    {
        return Some(Solution::new(
            format!(
                "The clues are inconsistent: \"{self_reference}\" makes the speaker {}, but the speaker says they are {}.",
                implied.label(),
                stated.label()
            ),
            goal,
            constraint,
            "the stated gender contradicts the implied one",
        ));
    }

    let term = child_term(subject);
    Some(Solution::new(
        format!("The {subject} in the photograph is the speaker's {term}."),
        goal,
        constraint,
        format!("the {subject}'s {relation} is the speaker, so the {subject} is the speaker's {term}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_is_not_a_question() {
        assert!(
            solve(
                "Brothers and sisters I have none, but that man's father is my father's son. I love the whole photograph.",
            )
            .is_none()
        );
    }

    #[test]
    fn classic_riddle_resolves_to_son() {
        let solution = solve(
            "Brothers and sisters I have none, but that man's father is my father's son. Who is in the photograph?",
        )
        .unwrap();
        assert_eq!(solution.answer, "The man in the photograph is the speaker's son.");
    }

    #[test]
    fn only_son_clause_is_its_own_anchor() {
        let solution = solve(
            "Looking at a picture, I say: this woman's father is my mother's only son. Who is in the picture?",
        )
        .unwrap();
        assert_eq!(
            solution.answer,
            "The woman in the photograph is the speaker's daughter."
        );
    }

    #[test]
    fn stated_gender_conflict_is_flagged() {
        let solution = solve(
            "I'm a woman and I have no siblings. That man's father is my father's son. Who is in the photo?",
        )
        .unwrap();
        assert!(solution.answer.starts_with("The clues are inconsistent"));
        assert!(solution.answer.contains("says they are female"));
    }

    #[test]
    fn relation_and_child_disagree() {
        let solution = solve(
            "I am an only child. That boy's mother is my father's son. Who is in the photo?",
        )
        .unwrap();
        assert!(solution.answer.starts_with("The clues are inconsistent"));
    }

    #[test]
    fn requires_anchor_or_only() {
        assert!(solve("That man's father is my father's son. Who is in the photo?").is_none());
        assert!(solve("Who took this photo?").is_none());
    }
}
