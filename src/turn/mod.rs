//! One-turn composition: route, capability grant, optional guardrails answer.

use crate::audit::{AuditEvent, AuditSink};
use crate::config::Config;
use crate::error::Cancelled;
use crate::guardrails::{GuardrailsCoordinator, GuardrailsPipelineResult, ReasoningGuardrailsPipeline};
use crate::llm::{ChatClient, ToolSpec};
use crate::policy::{CapabilityPolicyGate, PolicyDecision, ToolConflictMatrix};
use crate::router::{IntentRouter, RouterContext, RouterOutput};
use crate::tools::{ToolCapabilityRegistry, ToolExecutor, ToolRound};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything the orchestrator needs to handle one user turn.
#[derive(Debug, Clone)]
pub struct TurnPlan {
    pub turn_id: Uuid,
    pub route: RouterOutput,
    pub policy: PolicyDecision,
    /// `Some` when the guardrails pipeline produced the final answer.
    pub guardrails: Option<GuardrailsPipelineResult>,
}

impl TurnPlan {
    pub fn answered_by_guardrails(&self) -> bool {
        self.guardrails.is_some()
    }

    /// The turn continues into the tool loop.
    pub fn enters_tool_loop(&self) -> bool {
        self.guardrails.is_none() && self.policy.use_tool_loop
    }
}

pub struct TurnPlanner {
    router: IntentRouter,
    gate: CapabilityPolicyGate,
    guardrails: GuardrailsCoordinator,
    registry: Arc<ToolCapabilityRegistry>,
    audit: Arc<dyn AuditSink>,
}

impl TurnPlanner {
    pub fn new(
        router: IntentRouter,
        guardrails: GuardrailsCoordinator,
        registry: Arc<ToolCapabilityRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            router,
            gate: CapabilityPolicyGate::new(registry.clone()),
            guardrails,
            registry,
            audit,
        }
    }

    /// Wire every component from one config and one optional model client.
    pub fn from_config(
        config: &Config,
        llm: Option<Arc<dyn ChatClient>>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let mut router = IntentRouter::new(config.router.clone());
        if let Some(client) = &llm {
            router = router.with_llm(client.clone());
        }
        let pipeline =
            ReasoningGuardrailsPipeline::new(llm, config.guardrails.clone(), audit.clone());
        Self::new(
            router,
            GuardrailsCoordinator::new(pipeline),
            Arc::new(ToolCapabilityRegistry::new()),
            audit,
        )
    }

    pub fn gate(&self) -> &CapabilityPolicyGate {
        &self.gate
    }

    pub fn router(&self) -> &IntentRouter {
        &self.router
    }

    /// A tool round sharing this planner's registry and audit sink.
    pub fn tool_round(&self, executor: Arc<dyn ToolExecutor>) -> ToolRound {
        ToolRound::new(
            ToolConflictMatrix::new(self.registry.clone()),
            executor,
            self.audit.clone(),
        )
    }

    /// Names the model may call this turn, for [`ToolRound::run`].
    pub fn allowed_tools(&self, plan: &TurnPlan, specs: &[ToolSpec]) -> BTreeSet<String> {
        self.gate.allowed_tool_set(&plan.policy, specs)
    }

    pub async fn plan(
        &self,
        text: &str,
        ctx: &RouterContext,
        cancel: &CancellationToken,
    ) -> Result<TurnPlan, Cancelled> {
        let turn_id = Uuid::new_v4();
        let route = self.router.route(text, ctx, cancel).await?;

        let policy = self.gate.evaluate(&route);
        self.audit.record(
            AuditEvent::new("policy", "decision", if policy.use_tool_loop { "tool_loop" } else { "chat" })
                .with("turn_id", turn_id)
                .with("intent", policy.intent)
                .with("allowed", policy.effective_capabilities().len())
                .with("used_fallback", policy.used_fallback),
        );

        let guardrails = self.guardrails.try_answer(text, &route, cancel).await?;
        if let Some(result) = &guardrails {
            info!(%turn_id, source = %result.source, round_trips = result.round_trips, "turn answered by guardrails");
        } else {
            debug!(%turn_id, intent = %route.intent, use_tool_loop = policy.use_tool_loop, "turn planned");
        }

        Ok(TurnPlan {
            turn_id,
            route,
            policy,
            guardrails,
        })
    }
}
