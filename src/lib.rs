#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::new_without_default,
    clippy::return_self_not_must_use
)]

pub mod audit;
pub mod config;
pub mod error;
pub mod guardrails;
pub mod llm;
pub mod policy;
pub mod router;
pub mod tools;
pub mod turn;
pub mod utils;

pub use config::Config;
pub use error::{Cancelled, CoreError};
pub use guardrails::{GuardrailsCoordinator, GuardrailsPipelineResult, ReasoningGuardrailsPipeline};
pub use policy::{CapabilityPolicyGate, Intent, PolicyDecision, ToolConflictMatrix};
pub use router::{IntentRouter, RouterContext, RouterOutput};
pub use tools::{Capability, PermissionCapability, ToolCapabilityRegistry, ToolExecutor, ToolRound};
pub use turn::{TurnPlan, TurnPlanner};
