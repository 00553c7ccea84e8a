use super::executor::ToolExecutor;
use crate::audit::{AuditEvent, AuditSink};
use crate::error::Cancelled;
use crate::llm::ToolCallRequest;
use crate::policy::{ToolConflictMatrix, ToolConflictResolution};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One executed winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub call: ToolCallRequest,
    pub output: String,
    pub ok: bool,
}

/// Outcome of one round of the iterative tool loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub resolution: ToolConflictResolution,
    pub executed: Vec<ToolCallRecord>,
}

impl RoundReport {
    pub fn skipped_names(&self) -> Vec<&str> {
        self.resolution
            .skipped
            .iter()
            .map(|skip| skip.call.name.as_str())
            .collect()
    }
}

/// Conflict resolution followed by strictly sequential execution of the
/// winners. No two calls from one round are ever in flight together, so
/// `tool.start` / `tool.end` pairs never interleave in the audit log.
pub struct ToolRound {
    matrix: ToolConflictMatrix,
    executor: Arc<dyn ToolExecutor>,
    audit: Arc<dyn AuditSink>,
}

impl ToolRound {
    pub fn new(
        matrix: ToolConflictMatrix,
        executor: Arc<dyn ToolExecutor>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            matrix,
            executor,
            audit,
        }
    }

    pub async fn run(
        &self,
        calls: &[ToolCallRequest],
        allowed_tools: &BTreeSet<String>,
        cancel: &CancellationToken,
    ) -> Result<RoundReport, Cancelled> {
        let resolution = self.matrix.resolve_turn(calls, allowed_tools);
        for skip in &resolution.skipped {
            let mut event = AuditEvent::new("tool", "conflict_skip", "skipped")
                .with("tool", &skip.call.name)
                .with("reason", skip.reason);
            if let Some(winner) = &skip.winner {
                event = event.with("winner", winner);
            }
            self.audit.record(event);
        }

        let mut executed = Vec::with_capacity(resolution.winners.len());
        for call in &resolution.winners {
            if cancel.is_cancelled() {
                debug!(executed = executed.len(), "tool round cancelled");
                return Err(Cancelled);
            }
            executed.push(self.execute(call, cancel).await?);
        }

        Ok(RoundReport {
            resolution,
            executed,
        })
    }

    async fn execute(
        &self,
        call: &ToolCallRequest,
        cancel: &CancellationToken,
    ) -> Result<ToolCallRecord, Cancelled> {
        self.audit.record(
            AuditEvent::new("tool", "start", "started")
                .with("tool", &call.name)
                .with("call_id", &call.id),
        );
        let started = Instant::now();

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = self.executor.call_tool(&call.name, &call.arguments, cancel) => Some(result),
        };
        let Some(result) = outcome else {
            self.audit.record(
                AuditEvent::new("tool", "end", "cancelled")
                    .with("tool", &call.name)
                    .with("call_id", &call.id),
            );
            return Err(Cancelled);
        };

        let (output, ok) = match result {
            Ok(output) => (output, true),
            Err(e) => {
                warn!(tool = %call.name, "tool call failed");
                (format!("error: {e}"), false)
            }
        };
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(tool = %call.name, ok, elapsed_ms, "tool call finished");
        self.audit.record(
            AuditEvent::new("tool", "end", if ok { "ok" } else { "error" })
                .with("tool", &call.name)
                .with("call_id", &call.id)
                .with("elapsed_ms", elapsed_ms),
        );

        Ok(ToolCallRecord {
            call: call.clone(),
            output,
            ok,
        })
    }
}
