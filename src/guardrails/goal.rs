use super::cues;
use super::stage::StageRunner;
use super::types::{GoalInference, Stage};
use crate::error::Cancelled;
use crate::utils::text::normalize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const GOAL_PROMPT: &str = "Infer the practical, real-world goal behind the user's question: what \
must physically or actually happen for them to be satisfied. Reply with JSON only: \
{\"goal\":\"<short goal>\",\"alternatives\":[\"<other plausible goal>\"],\"confidence\":0.0-1.0}";

const HEURISTIC_CONFIDENCE: f64 = 0.55;

/// Keyword goal for when the model is unavailable.
pub fn heuristic_goal(text: &str) -> Option<GoalInference> {
    let normalized = normalize(text);
    let service = cues::service_in(&normalized)?;
    Some(GoalInference {
        goal: service.goal.to_string(),
        alternatives: Vec::new(),
        confidence: HEURISTIC_CONFIDENCE,
    })
}

/// Stage 2. Returns the inference and the round trips it cost.
pub async fn infer(
    runner: &StageRunner,
    text: &str,
    budget: Duration,
    cancel: &CancellationToken,
) -> Result<(Option<GoalInference>, u32), Cancelled> {
    let reply = runner
        .ask_json(
            Stage::GoalInference,
            GOAL_PROMPT,
            text.to_string(),
            budget,
            cancel,
            |mut goal: GoalInference| {
                goal.goal = goal.goal.trim().to_string();
                if goal.goal.is_empty() {
                    return Err("empty goal".into());
                }
                goal.confidence = goal.confidence.clamp(0.0, 1.0);
                goal.alternatives.retain(|a| !a.trim().is_empty());
                Ok(goal)
            },
        )
        .await?;
    let round_trips = reply.round_trips;
    let goal = reply.ok().or_else(|| heuristic_goal(text));
    Ok((goal, round_trips))
}
