use super::stage::StageRunner;
use super::types::{GuardrailsPipelineResult, Stage, TriggerSource};
use super::{constraints, evaluate, extract, goal, solvers, trigger};
use crate::audit::{AuditEvent, AuditSink};
use crate::config::GuardrailsConfig;
use crate::error::Cancelled;
use crate::llm::ChatClient;
use crate::router::RiskLevel;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Staged defensive reasoning for goal-conflict questions.
///
/// Stage 0 tries the deterministic solvers. Stages 1 to 4 may call the
/// model, each under its own budget with a heuristic fallback; stage 5 is a
/// pure scoring pass. Any stage that produces nothing usable ends the
/// attempt with `Ok(None)` and the turn continues on its normal path.
pub struct ReasoningGuardrailsPipeline {
    runner: StageRunner,
    config: GuardrailsConfig,
}

impl ReasoningGuardrailsPipeline {
    pub fn new(
        llm: Option<Arc<dyn ChatClient>>,
        config: GuardrailsConfig,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let runner = StageRunner::new(llm, config.stage_max_tokens, audit);
        Self { runner, config }
    }

    pub fn config(&self) -> &GuardrailsConfig {
        &self.config
    }

    fn audit(&self) -> &dyn AuditSink {
        self.runner.audit()
    }

    /// Stage 0 alone. Free of model calls.
    pub fn special_case(&self, text: &str) -> Option<GuardrailsPipelineResult> {
        if !self.config.special_cases {
            return None;
        }
        let (kind, solution) = solvers::solve(text)?;
        let source = TriggerSource::SpecialCase(kind);
        info!(%source, "guardrails special case answered");
        self.audit()
            .record(AuditEvent::new("guardrails", "special_case", "answered").with("kind", kind));
        Some(GuardrailsPipelineResult {
            answer: solution.answer,
            rationale: solution.rationale,
            risk: RiskLevel::Medium,
            why: format!("recognised {kind} pattern"),
            source,
            round_trips: 0,
        })
    }

    pub async fn run(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<GuardrailsPipelineResult>, Cancelled> {
        if let Some(result) = self.special_case(text) {
            return Ok(Some(result));
        }

        let decision = trigger::detect(
            &self.runner,
            text,
            self.config.mode,
            self.config.tiny_model_trigger,
            self.config.trigger_timeout(),
            cancel,
        )
        .await?;
        self.audit().record(
            AuditEvent::new(
                "guardrails",
                "trigger",
                if decision.triggered { "triggered" } else { "skipped" },
            )
            .with("source", decision.source)
            .with("risk", decision.risk)
            .with("round_trips", decision.round_trips),
        );
        if !decision.triggered {
            debug!(source = %decision.source, "guardrails not triggered");
            return Ok(None);
        }
        let mut round_trips = decision.round_trips;
        let budget = self.config.stage_timeout();

        let (goal, spent) = goal::infer(&self.runner, text, budget, cancel).await?;
        round_trips += spent;
        let Some(goal) = goal else {
            return Ok(self.abort(Stage::GoalInference, round_trips));
        };

        let (entities, spent) = extract::extract(&self.runner, text, budget, cancel).await?;
        round_trips += spent;
        let Some(entities) = entities else {
            return Ok(self.abort(Stage::EntityExtraction, round_trips));
        };

        let (constraint_set, spent) =
            constraints::build(&self.runner, text, &goal, &entities, budget, cancel).await?;
        round_trips += spent;
        let Some(constraint_set) = constraint_set else {
            return Ok(self.abort(Stage::ConstraintBuilding, round_trips));
        };

        let Some(evaluation) = evaluate::evaluate(text, &goal, &entities, &constraint_set) else {
            self.record_decision("aborted", "evaluation", round_trips);
            return Ok(None);
        };
        let (answer, rationale) = evaluate::compose(&goal, &constraint_set, &evaluation);

        info!(
            source = %decision.source,
            round_trips,
            loss_reason = %evaluation.loss_reason,
            "guardrails pipeline answered"
        );
        self.audit().record(
            AuditEvent::new("guardrails", "decision", "answered")
                .with("source", decision.source)
                .with("loss_reason", evaluation.loss_reason)
                .with("options", evaluation.scores.len())
                .with("round_trips", round_trips),
        );

        Ok(Some(GuardrailsPipelineResult {
            answer,
            rationale,
            risk: decision.risk,
            why: decision.why,
            source: decision.source,
            round_trips,
        }))
    }

    fn abort(&self, stage: Stage, round_trips: u32) -> Option<GuardrailsPipelineResult> {
        debug!(%stage, round_trips, "guardrails attempt abandoned");
        self.record_decision("aborted", &stage.to_string(), round_trips);
        None
    }

    fn record_decision(&self, result: &str, at: &str, round_trips: u32) {
        self.audit().record(
            AuditEvent::new("guardrails", "decision", result)
                .with("at", at)
                .with("round_trips", round_trips),
        );
    }
}
