use super::stage::StageRunner;
use super::types::{ConstraintSet, EntityExtraction, GoalInference, Stage};
use crate::error::Cancelled;
use crate::utils::text::normalize;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const CONSTRAINT_PROMPT: &str = "Given a goal, the entities it depends on and candidate actions, \
list short, testable constraints any correct action must satisfy. Reply with JSON only: \
{\"constraints\":[\"...\"]}";

const MAX_CONSTRAINTS: usize = 6;

static ORDERING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<a>\w+(?:\s+\w+){0,3}?)\s+(?P<cue>before|needs|requires|require|need)\s+(?P<b>\w+(?:\s+\w+){0,3})")
        .expect("ordering regex")
});

/// Feasibility, one line per required entity, ordering cues, goal progress.
pub fn heuristic_constraints(
    text: &str,
    goal: &GoalInference,
    entities: &EntityExtraction,
) -> ConstraintSet {
    let normalized = normalize(text);
    let mut constraints = vec!["the chosen action must be physically feasible for the user".to_string()];
    for entity in &entities.required_entities {
        constraints.push(format!("the {entity} must be present where the goal is completed"));
    }
    for caps in ORDERING_RE.captures_iter(&normalized) {
        if let (Some(a), Some(cue), Some(b)) = (caps.name("a"), caps.name("cue"), caps.name("b")) {
            constraints.push(format!("ordering: {} {} {}", a.as_str(), cue.as_str(), b.as_str()));
        }
    }
    constraints.push(format!("the action must make progress toward: {}", goal.goal));
    constraints.truncate(MAX_CONSTRAINTS);
    ConstraintSet { constraints }
}

/// Stage 4.
pub async fn build(
    runner: &StageRunner,
    text: &str,
    goal: &GoalInference,
    entities: &EntityExtraction,
    budget: Duration,
    cancel: &CancellationToken,
) -> Result<(Option<ConstraintSet>, u32), Cancelled> {
    let prompt = json!({
        "question": text,
        "goal": goal.goal,
        "required_entities": entities.required_entities,
        "options": entities.options,
    })
    .to_string();

    let reply = runner
        .ask_json(
            Stage::ConstraintBuilding,
            CONSTRAINT_PROMPT,
            prompt,
            budget,
            cancel,
            |mut set: ConstraintSet| {
                set.constraints = set
                    .constraints
                    .iter()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .take(MAX_CONSTRAINTS)
                    .collect();
                if set.constraints.is_empty() {
                    Err("empty constraint set".into())
                } else {
                    Ok(set)
                }
            },
        )
        .await?;
    let round_trips = reply.round_trips;
    let set = reply
        .ok()
        .unwrap_or_else(|| heuristic_constraints(text, goal, entities));
    Ok(((!set.constraints.is_empty()).then_some(set), round_trips))
}
