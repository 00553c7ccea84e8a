use super::pipeline::ReasoningGuardrailsPipeline;
use super::types::GuardrailsPipelineResult;
use crate::config::GuardrailsMode;
use crate::error::Cancelled;
use crate::router::RouterOutput;
use crate::utils::text::{contains_any, normalize};
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Writing requests that legitimately contain odd choices.
const CREATIVE_CUES: &[&str] = &[
    "write a dialogue",
    "write dialogue",
    "roleplay",
    "role-play",
    "role play",
    "pretend you are",
    "pretend to be",
    "write a story",
    "write a scene",
    "screenplay",
    "act as",
];

/// Why the entry gate declined a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GateSkip {
    ModeOff,
    ToolCommitted,
    CreativeWriting,
}

/// Entry gate in front of [`ReasoningGuardrailsPipeline`].
pub struct GuardrailsCoordinator {
    pipeline: ReasoningGuardrailsPipeline,
}

impl GuardrailsCoordinator {
    pub fn new(pipeline: ReasoningGuardrailsPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &ReasoningGuardrailsPipeline {
        &self.pipeline
    }

    pub fn gate(&self, text: &str, route: &RouterOutput) -> Result<(), GateSkip> {
        if self.pipeline.config().mode == GuardrailsMode::Off {
            return Err(GateSkip::ModeOff);
        }
        if route.intent.is_tool_committed() {
            return Err(GateSkip::ToolCommitted);
        }
        if contains_any(&normalize(text), CREATIVE_CUES) {
            return Err(GateSkip::CreativeWriting);
        }
        Ok(())
    }

    /// `Ok(None)` means the turn proceeds on its normal path.
    pub async fn try_answer(
        &self,
        text: &str,
        route: &RouterOutput,
        cancel: &CancellationToken,
    ) -> Result<Option<GuardrailsPipelineResult>, Cancelled> {
        if let Err(skip) = self.gate(text, route) {
            debug!(reason = %skip, intent = %route.intent, "guardrails gate closed");
            return Ok(None);
        }
        self.pipeline.run(text, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::NoopAuditSink;
    use crate::config::GuardrailsConfig;
    use crate::policy::Intent;
    use crate::router::RouteSource;
    use std::sync::Arc;

    fn coordinator(mode: GuardrailsMode) -> GuardrailsCoordinator {
        let config = GuardrailsConfig {
            mode,
            ..GuardrailsConfig::default()
        };
        GuardrailsCoordinator::new(ReasoningGuardrailsPipeline::new(
            None,
            config,
            Arc::new(NoopAuditSink),
        ))
    }

    fn chat_route() -> RouterOutput {
        RouterOutput::new(Intent::ChatOnly, 0.75, RouteSource::Llm)
    }

    #[test]
    fn gate_rules() {
        let auto = coordinator(GuardrailsMode::Auto);
        assert_eq!(auto.gate("walk or drive?", &chat_route()), Ok(()));
        assert_eq!(
            coordinator(GuardrailsMode::Off).gate("walk or drive?", &chat_route()),
            Err(GateSkip::ModeOff)
        );
        let file_route = RouterOutput::new(Intent::FileTask, 0.9, RouteSource::Heuristic);
        assert_eq!(auto.gate("walk or drive?", &file_route), Err(GateSkip::ToolCommitted));
        assert_eq!(
            auto.gate("Write a dialogue where Sam asks: walk or drive?", &chat_route()),
            Err(GateSkip::CreativeWriting)
        );
    }

    #[tokio::test]
    async fn special_case_answers_through_the_gate() {
        let result = coordinator(GuardrailsMode::Auto)
            .try_answer(
                "which weighs more: 2 pounds or 900 grams?",
                &chat_route(),
                &CancellationToken::new(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.answer, "2 pounds weighs more.");
    }

    #[tokio::test]
    async fn closed_gate_skips_even_special_cases() {
        let result = coordinator(GuardrailsMode::Off)
            .try_answer(
                "which weighs more: 2 pounds or 900 grams?",
                &chat_route(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
