use super::traits::{AuditEvent, AuditSink};
use std::sync::Mutex;

/// In-process sink that keeps every event, for inspection by the embedding
/// application and by tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|e| format!("{}.{}", e.actor, e.action))
            .collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }

    fn name(&self) -> &str {
        "memory"
    }
}
