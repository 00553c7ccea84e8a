use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Tool execution contract. Only ever called with calls that survived
/// conflict resolution for the current round.
///
/// An `Err` is turned into a textual error result by the caller; it never
/// aborts the round.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn call_tool(
        &self,
        name: &str,
        arguments: &Value,
        cancel: &CancellationToken,
    ) -> anyhow::Result<String>;
}
