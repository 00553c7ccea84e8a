use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One append-only audit record.
///
/// `detail` carries identifiers, reason codes and counts only. Raw user text,
/// OCR output, file contents and tool output bodies never go in here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor: String,
    pub action: String,
    pub result: String,
    #[serde(default)]
    pub detail: BTreeMap<String, String>,
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
            result: result.into(),
            detail: BTreeMap::new(),
            at: Utc::now(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.detail.insert(key.into(), value.to_string());
        self
    }
}

/// Append-only event sink
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);

    /// Human-readable name of this sink
    fn name(&self) -> &str;
}
