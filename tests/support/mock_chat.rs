#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use turngate::llm::{ChatClient, ChatRequest, ChatResponse};

/// One scripted model turn.
pub enum Step {
    Reply(&'static str),
    Fail,
    /// Never answers; only cancellation or the caller's timeout ends it.
    Hang,
}

/// Replays `Step`s in order. An exhausted script fails every further call.
pub struct ScriptedChat {
    steps: Mutex<VecDeque<Step>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(VecDeque::from(steps)),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(replies: &[&'static str]) -> Self {
        Self::new(replies.iter().map(|r| Step::Reply(r)).collect())
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChat {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ChatResponse> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        let step = self
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match step {
            Some(Step::Reply(text)) => Ok(ChatResponse::text_only(text)),
            Some(Step::Fail) | None => anyhow::bail!("scripted provider failure"),
            Some(Step::Hang) => {
                cancel.cancelled().await;
                anyhow::bail!("request cancelled")
            }
        }
    }
}
