use crate::router::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

/// Deterministic puzzle shapes answered without any model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialCaseKind {
    CompletedTask,
    MassComparison,
    MeetingOverlap,
    FamilyPhoto,
    AmbiguousReferent,
}

/// What decided that guardrails apply to a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    Heuristic,
    TinyModel,
    ModeAlways,
    SpecialCase(SpecialCaseKind),
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heuristic => f.write_str("heuristic"),
            Self::TinyModel => f.write_str("tiny_model"),
            Self::ModeAlways => f.write_str("mode_always"),
            Self::SpecialCase(kind) => write!(f, "special_case:{kind}"),
        }
    }
}

/// Pipeline stages that may call the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Trigger,
    GoalInference,
    EntityExtraction,
    ConstraintBuilding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailsTriggerDecision {
    pub triggered: bool,
    pub risk: RiskLevel,
    pub why: String,
    pub source: TriggerSource,
    pub round_trips: u32,
}

impl GuardrailsTriggerDecision {
    pub fn not_triggered(why: impl Into<String>, source: TriggerSource, round_trips: u32) -> Self {
        Self {
            triggered: false,
            risk: RiskLevel::Low,
            why: why.into(),
            source,
            round_trips,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalInference {
    pub goal: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntityExtraction {
    #[serde(default)]
    pub required_entities: Vec<String>,
    #[serde(default)]
    pub optional_entities: Vec<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl EntityExtraction {
    /// At least two distinct, non-empty options to choose between.
    pub fn has_choice(&self) -> bool {
        let mut usable: Vec<&str> = self
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .collect();
        usable.sort_unstable();
        usable.dedup();
        usable.len() >= 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// Why the runner-up lost, in reporting priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LossReason {
    MissingPrerequisite,
    LessFeasible,
    MoreIndirect,
    WeakerOnOrdering,
    FewerChecks,
}

impl LossReason {
    pub fn phrase(self) -> &'static str {
        match self {
            Self::MissingPrerequisite => "is missing a prerequisite",
            Self::LessFeasible => "is less feasible",
            Self::MoreIndirect => "is more indirect",
            Self::WeakerOnOrdering => "is weaker on ordering",
            Self::FewerChecks => "passes fewer checks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionScore {
    pub option: String,
    pub score: f64,
    pub checks_passed: u8,
    pub physical: bool,
    pub indirect: bool,
    pub feasible: bool,
    pub ordering: f64,
    pub missing_entities: Vec<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDecision {
    pub scores: Vec<OptionScore>,
    pub selected: usize,
    pub runner_up: usize,
    pub loss_reason: LossReason,
}

impl EvaluationDecision {
    pub fn winner(&self) -> &OptionScore {
        &self.scores[self.selected]
    }

    pub fn loser(&self) -> &OptionScore {
        &self.scores[self.runner_up]
    }
}

/// Final guardrails answer for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailsPipelineResult {
    pub answer: String,
    /// Goal / Constraint / Decision, one to three lines.
    pub rationale: Vec<String>,
    pub risk: RiskLevel,
    pub why: String,
    pub source: TriggerSource,
    pub round_trips: u32,
}
