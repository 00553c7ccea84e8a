//! Stage 5: pure option scoring. No model calls.

use super::cues::{
    self, COMPLETION_CUES, INDIRECT_CUES, PHYSICAL_CUES, REMOTE_CUES, STALL_CUES,
};
use super::types::{
    ConstraintSet, EntityExtraction, EvaluationDecision, GoalInference, LossReason, OptionScore,
};
use crate::utils::text::{capitalize, contains_any, normalize};
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

const PHYSICAL_BONUS: f64 = 2.2;
const INDIRECT_PENALTY: f64 = 1.6;
const REMOTE_SUBSTITUTE_PENALTY: f64 = 2.8;
const ENTITY_BONUS: f64 = 1.4;
const MISSING_ENTITY_PENALTY: f64 = 1.1;
const GOAL_BONUS: f64 = 2.0;
const STALL_PENALTY: f64 = 1.0;
const ORDERING_WEIGHT: f64 = 0.8;
const CHECK_BONUS: f64 = 0.15;
const SCORE_EPSILON: f64 = 1e-9;

static BEFORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<pre>\w+(?:\s+\w+){0,3})\s+before\s+(?P<post>\w+(?:\s+\w+){0,3})")
        .expect("before regex")
});

struct OrderingCue {
    pre: String,
    post: String,
}

fn ordering_cue(text: &str) -> Option<OrderingCue> {
    let caps = BEFORE_RE.captures(text)?;
    Some(OrderingCue {
        pre: caps.name("pre")?.as_str().to_string(),
        post: caps.name("post")?.as_str().to_string(),
    })
}

fn required_entities(entities: &EntityExtraction, constraints: &ConstraintSet) -> Vec<String> {
    let mut required = entities.required_entities.clone();
    for constraint in &constraints.constraints {
        for entity in cues::entities_mentioned(&normalize(constraint)) {
            if !required.iter().any(|r| r == entity) {
                required.push(entity.to_string());
            }
        }
    }
    required
}

fn score_option(
    option: &str,
    goal: &GoalInference,
    required: &[String],
    ordering: Option<&OrderingCue>,
) -> OptionScore {
    let mut score = 0.0;
    let mut notes = Vec::new();

    let physical = contains_any(option, PHYSICAL_CUES);
    if physical {
        score += PHYSICAL_BONUS;
        notes.push("physical action".to_string());
    }
    let indirect = contains_any(option, INDIRECT_CUES);
    if indirect {
        score -= INDIRECT_PENALTY;
        notes.push("indirect action".to_string());
    }

    let mut covered = cues::entities_mentioned(option);
    covered.extend(cues::entities_implied(option));
    let mut missing_entities = Vec::new();
    for entity in required {
        if covered.contains(&entity.as_str()) {
            score += ENTITY_BONUS;
            notes.push(format!("covers {entity}"));
        } else {
            score -= MISSING_ENTITY_PENALTY;
            notes.push(format!("missing {entity}"));
            missing_entities.push(entity.clone());
        }
    }

    let remote_substitute = contains_any(option, REMOTE_CUES) && !missing_entities.is_empty();
    if remote_substitute {
        score -= REMOTE_SUBSTITUTE_PENALTY;
        notes.push("remote substitute".to_string());
    }

    let stalls = contains_any(option, STALL_CUES);
    let advances = cues::shares_token(option, &goal.goal) || contains_any(option, COMPLETION_CUES);
    if advances {
        score += GOAL_BONUS;
        notes.push("advances the goal".to_string());
    }
    if stalls {
        score -= STALL_PENALTY;
        notes.push("stalls".to_string());
    }

    let ordering_delta = match ordering {
        Some(cue) if cues::shares_token(option, &cue.pre) => ORDERING_WEIGHT,
        Some(cue) if cues::shares_token(option, &cue.post) => -ORDERING_WEIGHT,
        _ => 0.0,
    };
    if ordering_delta > 0.0 {
        notes.push("respects ordering".to_string());
    } else if ordering_delta < 0.0 {
        notes.push("skips a prior step".to_string());
    }
    score += ordering_delta;

    let feasible = !remote_substitute && !(indirect && !physical);
    let checks = [feasible, missing_entities.is_empty(), advances && !stalls];
    let checks_passed = u8::try_from(checks.iter().filter(|c| **c).count()).unwrap_or(u8::MAX);
    score += CHECK_BONUS * f64::from(checks_passed);

    OptionScore {
        option: option.to_string(),
        score,
        checks_passed,
        physical,
        indirect,
        feasible,
        ordering: ordering_delta,
        missing_entities,
        notes,
    }
}

/// Higher score first, then more checks, then a physical cue. Stable sorts
/// keep the earlier option on a full tie.
fn rank(a: &OptionScore, b: &OptionScore) -> Ordering {
    if (a.score - b.score).abs() > SCORE_EPSILON {
        return b.score.total_cmp(&a.score);
    }
    b.checks_passed
        .cmp(&a.checks_passed)
        .then_with(|| b.physical.cmp(&a.physical))
}

fn loss_reason(winner: &OptionScore, loser: &OptionScore) -> LossReason {
    if loser.missing_entities.len() > winner.missing_entities.len() {
        LossReason::MissingPrerequisite
    } else if winner.feasible && !loser.feasible {
        LossReason::LessFeasible
    } else if loser.indirect && !winner.indirect {
        LossReason::MoreIndirect
    } else if loser.ordering < winner.ordering {
        LossReason::WeakerOnOrdering
    } else {
        LossReason::FewerChecks
    }
}

/// Score every option and pick one. `None` with fewer than two options.
pub fn evaluate(
    text: &str,
    goal: &GoalInference,
    entities: &EntityExtraction,
    constraints: &ConstraintSet,
) -> Option<EvaluationDecision> {
    if !entities.has_choice() {
        return None;
    }
    let normalized = normalize(text);
    let ordering = ordering_cue(&normalized);
    let required = required_entities(entities, constraints);

    let scores: Vec<OptionScore> = entities
        .options
        .iter()
        .map(|option| score_option(&normalize(option), goal, &required, ordering.as_ref()))
        .collect();

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| rank(&scores[*a], &scores[*b]));
    let (selected, runner_up) = (order[0], order[1]);
    let loss_reason = loss_reason(&scores[selected], &scores[runner_up]);

    Some(EvaluationDecision {
        scores,
        selected,
        runner_up,
        loss_reason,
    })
}

/// Answer text plus Goal / Constraint / Decision lines.
pub fn compose(
    goal: &GoalInference,
    constraints: &ConstraintSet,
    decision: &EvaluationDecision,
) -> (String, Vec<String>) {
    let winner = decision.winner();
    let loser = decision.loser();

    let mut answer = format!(
        "{}. \"{}\" {}",
        capitalize(&winner.option),
        loser.option,
        decision.loss_reason.phrase()
    );
    if decision.loss_reason == LossReason::MissingPrerequisite {
        answer.push_str(&format!(": the {}", loser.missing_entities.join(", the ")));
    }
    answer.push('.');

    let constraint = constraints
        .constraints
        .iter()
        .find(|c| loser.missing_entities.iter().any(|e| c.contains(e.as_str())))
        .or_else(|| constraints.constraints.first())
        .map_or_else(String::new, Clone::clone);

    let mut rationale = vec![format!("Goal: {}", goal.goal)];
    if !constraint.is_empty() {
        rationale.push(format!("Constraint: {constraint}"));
    }
    rationale.push(format!(
        "Decision: {} ({:.2}) over {} ({:.2})",
        winner.option, winner.score, loser.option, loser.score
    ));
    (answer, rationale)
}
