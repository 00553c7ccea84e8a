pub mod constraints;
pub mod coordinator;
pub mod cues;
pub mod evaluate;
pub mod extract;
pub mod goal;
pub mod pipeline;
pub mod solvers;
pub mod stage;
pub mod trigger;
pub mod types;

pub use coordinator::{GateSkip, GuardrailsCoordinator};
pub use pipeline::ReasoningGuardrailsPipeline;
pub use solvers::Solution;
pub use types::{
    ConstraintSet, EntityExtraction, EvaluationDecision, GoalInference, GuardrailsPipelineResult,
    GuardrailsTriggerDecision, LossReason, OptionScore, SpecialCaseKind, Stage, TriggerSource,
};
