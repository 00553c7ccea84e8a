use super::cues;
use super::stage::StageRunner;
use super::types::{GuardrailsTriggerDecision, Stage, TriggerSource};
use crate::config::GuardrailsMode;
use crate::error::Cancelled;
use crate::router::RiskLevel;
use crate::utils::text::normalize;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const TRIGGER_PROMPT: &str = "You screen questions for hidden goal conflicts: choices where one \
option silently fails a practical precondition (the object must be present, the place must be \
reached, the task is already done). Reply with JSON only: \
{\"risk\":\"low|medium|high\",\"why\":\"<short reason>\",\"suggest_guardrails\":true|false}";

#[derive(Debug, Deserialize)]
struct TinyVerdict {
    risk: String,
    #[serde(default)]
    why: String,
    suggest_guardrails: bool,
}

/// Deterministic cue: a choice between actions plus a service, object or
/// distance hint.
pub fn heuristic_trigger(text: &str) -> Option<GuardrailsTriggerDecision> {
    let normalized = normalize(text);
    if !cues::has_choice(&normalized) {
        return None;
    }
    let why = if cues::service_in(&normalized).is_some() {
        "choice between actions that involves a service location"
    } else if cues::mentions_required_object(&normalized) {
        "choice between actions that involves a required object"
    } else if cues::has_distance(&normalized) {
        "choice between actions with a distance cue"
    } else {
        return None;
    };
    Some(GuardrailsTriggerDecision {
        triggered: true,
        risk: RiskLevel::Medium,
        why: why.to_string(),
        source: TriggerSource::Heuristic,
        round_trips: 0,
    })
}

/// Stage 1. `None` is never returned: a failed model check means "not
/// triggered".
pub async fn detect(
    runner: &StageRunner,
    text: &str,
    mode: GuardrailsMode,
    tiny_model: bool,
    budget: Duration,
    cancel: &CancellationToken,
) -> Result<GuardrailsTriggerDecision, Cancelled> {
    if mode == GuardrailsMode::Always {
        return Ok(GuardrailsTriggerDecision {
            triggered: true,
            risk: RiskLevel::High,
            why: "guardrails mode is always".into(),
            source: TriggerSource::ModeAlways,
            round_trips: 0,
        });
    }
    if let Some(decision) = heuristic_trigger(text) {
        return Ok(decision);
    }
    if !tiny_model || !runner.has_llm() {
        return Ok(GuardrailsTriggerDecision::not_triggered(
            "no deterministic cue",
            TriggerSource::Heuristic,
            0,
        ));
    }

    let reply = runner
        .ask_json(
            Stage::Trigger,
            TRIGGER_PROMPT,
            text.to_string(),
            budget,
            cancel,
            |verdict: TinyVerdict| {
                if RiskLevel::parse_label(&verdict.risk).is_some() {
                    Ok(verdict)
                } else {
                    Err(format!("unknown risk label {:?}", verdict.risk))
                }
            },
        )
        .await?;
    let round_trips = reply.round_trips;

    Ok(match reply.ok() {
        Some(verdict) if verdict.suggest_guardrails => GuardrailsTriggerDecision {
            triggered: true,
            risk: RiskLevel::parse_label(&verdict.risk).unwrap_or(RiskLevel::Medium),
            why: if verdict.why.trim().is_empty() {
                "model flagged a possible goal conflict".into()
            } else {
                verdict.why.trim().to_string()
            },
            source: TriggerSource::TinyModel,
            round_trips,
        },
        Some(verdict) => GuardrailsTriggerDecision::not_triggered(
            verdict.why.trim(),
            TriggerSource::TinyModel,
            round_trips,
        ),
        None => GuardrailsTriggerDecision::not_triggered(
            "model check unavailable",
            TriggerSource::TinyModel,
            round_trips,
        ),
    })
}
