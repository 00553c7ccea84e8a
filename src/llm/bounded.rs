use super::traits::ChatClient;
use super::types::ChatRequest;
use crate::error::{Cancelled, StageError};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Text of one completed model call, with how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedReply {
    pub text: String,
    pub elapsed: Duration,
}

/// Run one chat call under its own `budget`.
///
/// The call gets a child of `cancel`, so the caller's cancellation reaches
/// it while the local deadline cancels only this call. The outer `Err` is
/// caller cancellation and must be propagated; the inner `Err` is a stage
/// failure the caller converts into its fallback.
pub async fn chat_within(
    client: &dyn ChatClient,
    request: ChatRequest,
    stage: &str,
    budget: Duration,
    cancel: &CancellationToken,
) -> Result<Result<BoundedReply, StageError>, Cancelled> {
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }

    let call_token = cancel.child_token();
    let started = Instant::now();
    let outcome = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        result = tokio::time::timeout(budget, client.chat(request, &call_token)) => Some(result),
    };
    call_token.cancel();

    // A client that bailed because the parent fired still reports caller
    // cancellation, not a stage failure.
    if cancel.is_cancelled() {
        return Err(Cancelled);
    }
    let elapsed = started.elapsed();

    let reply = match outcome {
        None => return Err(Cancelled),
        Some(Err(_)) => Err(StageError::Timeout {
            stage: stage.to_string(),
            budget_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
        }),
        Some(Ok(Err(error))) => Err(StageError::Failed {
            stage: stage.to_string(),
            message: error.to_string(),
        }),
        Some(Ok(Ok(response))) => response
            .into_text()
            .map(|text| BoundedReply { text, elapsed })
            .map_err(|error| StageError::Failed {
                stage: stage.to_string(),
                message: error.to_string(),
            }),
    };

    debug!(
        client = client.name(),
        stage,
        elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        outcome = reply.as_ref().map_or_else(StageError::kind, |_| "completed"),
        "bounded chat call"
    );
    Ok(reply)
}
