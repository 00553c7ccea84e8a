use super::traits::{AuditEvent, AuditSink};
use tracing::info;

/// Emits each event as an `info!` record under the `audit` message.
pub struct LogAuditSink;

impl LogAuditSink {
    pub fn new() -> Self {
        Self
    }
}

impl AuditSink for LogAuditSink {
    fn record(&self, event: AuditEvent) {
        info!(
            actor = %event.actor,
            action = %event.action,
            result = %event.result,
            detail = ?event.detail,
            "audit"
        );
    }

    fn name(&self) -> &str {
        "log"
    }
}
