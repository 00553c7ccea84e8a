use super::types::Stage;
use crate::audit::{AuditEvent, AuditSink};
use crate::error::{Cancelled, StageError};
use crate::llm::{ChatClient, ChatRequest, chat_within, parse_strict_json};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of one model-backed stage call.
#[derive(Debug)]
pub struct StageReply<T> {
    pub value: Result<T, StageError>,
    /// 1 when the model answered, malformed or not; 0 otherwise.
    pub round_trips: u32,
}

impl<T> StageReply<T> {
    fn unavailable(stage: Stage) -> Self {
        Self {
            value: Err(StageError::Failed {
                stage: stage.to_string(),
                message: "no chat client configured".into(),
            }),
            round_trips: 0,
        }
    }

    pub fn ok(self) -> Option<T> {
        self.value.ok()
    }
}

/// Runs strict-JSON stage prompts under per-stage budgets and records
/// fallbacks.
#[derive(Clone)]
pub struct StageRunner {
    llm: Option<Arc<dyn ChatClient>>,
    max_tokens: u32,
    audit: Arc<dyn AuditSink>,
}

impl StageRunner {
    pub fn new(llm: Option<Arc<dyn ChatClient>>, max_tokens: u32, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            llm,
            max_tokens,
            audit,
        }
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    pub fn audit(&self) -> &dyn AuditSink {
        self.audit.as_ref()
    }

    /// Ask for one JSON object and validate it with `check`.
    pub async fn ask_json<T, F>(
        &self,
        stage: Stage,
        system: &str,
        user: String,
        budget: Duration,
        cancel: &CancellationToken,
        check: F,
    ) -> Result<StageReply<T>, Cancelled>
    where
        T: DeserializeOwned,
        F: FnOnce(T) -> Result<T, String>,
    {
        let Some(llm) = self.llm.as_deref() else {
            return Ok(StageReply::unavailable(stage));
        };
        let request = ChatRequest::prompt(system, user)
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.0);

        let reply = chat_within(llm, request, &stage.to_string(), budget, cancel).await?;
        let (value, round_trips) = match reply {
            Ok(reply) => {
                let parsed = parse_strict_json::<T>(&reply.text)
                    .map_err(|e| e.to_string())
                    .and_then(check)
                    .map_err(|message| StageError::Malformed {
                        stage: stage.to_string(),
                        message,
                    });
                (parsed, 1)
            }
            Err(error) => (Err(error), 0),
        };

        if let Err(error) = &value {
            debug!(%stage, kind = error.kind(), "stage fell back");
            self.record_fallback(stage, error);
        }
        Ok(StageReply { value, round_trips })
    }

    pub fn record_fallback(&self, stage: Stage, error: &StageError) {
        self.audit.record(
            AuditEvent::new("guardrails", "stage_fallback", error.kind()).with("stage", stage),
        );
    }
}
