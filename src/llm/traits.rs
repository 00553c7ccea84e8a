use super::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Chat-completion contract consumed by the router and the guardrails stages.
///
/// Implementations should stop work when `cancel` fires. Callers treat any
/// `Err` or a [`FinishReason::Error`](super::FinishReason::Error) response as
/// a soft failure and fall back to heuristics.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Client identifier used in logs.
    fn name(&self) -> &str {
        "chat"
    }

    async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ChatResponse>;
}
