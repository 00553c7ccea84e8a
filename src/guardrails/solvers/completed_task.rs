use super::Solution;
use crate::utils::text::normalize;
use regex::Regex;
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bhow (?:long|much time) (?:does|will|would|did) it take\b").expect("duration regex")
});

static ALREADY_DONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:already(?:\s+been)?|has been|have been|is|are|was|were)\s+(?:already\s+)?(?P<state>built|done|completed|finished|made|written|painted|assembled|cooked|baked|cleaned|washed|fixed|installed|delivered|dug|knitted|sewn)\b",
    )
    .expect("already done regex")
});

pub fn solve(raw: &str) -> Option<Solution> {
    let text = normalize(raw);
    if !DURATION_RE.is_match(&text) {
        return None;
    }
    // "was built" alone describes history, not a finished job.
    let caps = ALREADY_DONE_RE
        .captures_iter(&text)
        .find(|c| c.get(0).is_some_and(|m| m.as_str().contains("already")))?;
    let state = caps.name("state")?.as_str();

    Some(Solution::new(
        "Zero time.",
        "finish the task",
        format!("the work is already {state}"),
        "nothing remains to be done, so it takes zero time",
    ))
}
