use super::heuristics::{self, Strictness};
use super::types::{MemoryWriteKind, RouteSource, RouterContext, RouterOutput};
use crate::config::RouterConfig;
use crate::error::Cancelled;
use crate::llm::{ChatClient, ChatRequest, chat_within};
use crate::policy::{FALLBACK_INTENT, Intent};
use crate::utils::text::{normalize, words};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const CLASSIFIER_PROMPT: &str = "Classify the user's message. Reply with exactly one word: \
chat (conversation, opinion, writing, reasoning), \
search (needs current information from the web), \
tool (needs files, screen, commands, memory or a website).";

const FAST_PATH_CONFIDENCE: f64 = 1.0;
const HEURISTIC_CONFIDENCE: f64 = 0.9;
const SEARCH_CONFIDENCE: f64 = 0.85;
const LLM_CONFIDENCE: f64 = 0.75;
const RELAXED_CONFIDENCE: f64 = 0.6;
const DEFAULT_CHAT_CONFIDENCE: f64 = 0.5;

/// Coarse label the single-word classifier may answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoarseLabel {
    Chat,
    Search,
    Tool,
}

impl CoarseLabel {
    fn parse(reply: &str) -> Option<Self> {
        let lowered = reply.to_lowercase();
        match words(&lowered).next()? {
            "chat" => Some(Self::Chat),
            "search" | "web" => Some(Self::Search),
            "tool" | "tools" => Some(Self::Tool),
            _ => None,
        }
    }
}

/// Per-turn intent classifier: deterministic rules first, then a one-word
/// model call, then relaxed heuristics.
pub struct IntentRouter {
    llm: Option<Arc<dyn ChatClient>>,
    config: RouterConfig,
}

impl IntentRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { llm: None, config }
    }

    pub fn with_llm(mut self, llm: Arc<dyn ChatClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Classify one user message. Only caller cancellation escapes; every
    /// model failure lands on the heuristic fallback.
    pub async fn route(
        &self,
        text: &str,
        ctx: &RouterContext,
        cancel: &CancellationToken,
    ) -> Result<RouterOutput, Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        let normalized = normalize(text);

        let output = if let Some(output) = Self::route_deterministic(&normalized, ctx) {
            output
        } else {
            match self.classify_with_llm(text, cancel).await? {
                Some(label) => Self::from_label(label, &normalized),
                None => Self::fallback(&normalized),
            }
        };

        debug!(
            intent = %output.intent,
            confidence = output.confidence,
            source = %output.source,
            "route decided"
        );
        Ok(output)
    }

    /// Rules that fire before any model call. `text` must be normalized.
    pub fn route_deterministic(text: &str, ctx: &RouterContext) -> Option<RouterOutput> {
        if let Some(intent) = heuristics::command_prefix(text) {
            let output = RouterOutput::new(intent, FAST_PATH_CONFIDENCE, RouteSource::FastPath);
            return Some(match intent {
                Intent::MemoryWrite => {
                    let kind = if text.starts_with("/forget") {
                        MemoryWriteKind::Revoke
                    } else {
                        MemoryWriteKind::Store
                    };
                    output.with_memory_write(kind)
                }
                _ => output,
            });
        }

        let matched = if heuristics::is_time_query(text) {
            Some(Intent::TimeQuery)
        } else if heuristics::is_screen_request(text) {
            Some(Intent::ScreenObserve)
        } else if heuristics::is_file_request(text) {
            Some(Intent::FileTask)
        } else if heuristics::is_system_request(text) {
            Some(Intent::SystemTask)
        } else if heuristics::is_browse_request(text) {
            Some(Intent::BrowseOnce)
        } else {
            None
        };
        if let Some(intent) = matched {
            return Some(RouterOutput::new(intent, HEURISTIC_CONFIDENCE, RouteSource::Heuristic));
        }

        // Tool and search matchers win over follow-ups.
        if !heuristics::is_web_search(text, Strictness::Strict)
            && let Some(follow_up) = heuristics::follow_up(text, ctx)
        {
            return Some(
                RouterOutput::new(Intent::ChatOnly, HEURISTIC_CONFIDENCE, RouteSource::Heuristic)
                    .with_follow_up(follow_up),
            );
        }

        if let Some(kind) = heuristics::memory_write_kind(text, Strictness::Strict) {
            return Some(
                RouterOutput::new(Intent::MemoryWrite, HEURISTIC_CONFIDENCE, RouteSource::Heuristic)
                    .with_memory_write(kind),
            );
        }
        if heuristics::is_memory_read(text) {
            return Some(RouterOutput::new(
                Intent::MemoryRead,
                HEURISTIC_CONFIDENCE,
                RouteSource::Heuristic,
            ));
        }

        if heuristics::is_web_search(text, Strictness::Strict) {
            return Some(RouterOutput::new(
                Intent::WebSearch,
                SEARCH_CONFIDENCE,
                RouteSource::Heuristic,
            ));
        }
        None
    }

    async fn classify_with_llm(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CoarseLabel>, Cancelled> {
        if !self.config.llm_enabled {
            return Ok(None);
        }
        let Some(llm) = self.llm.as_deref() else {
            return Ok(None);
        };

        let request = ChatRequest::prompt(CLASSIFIER_PROMPT, text)
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);
        let reply = chat_within(llm, request, "router", self.config.timeout(), cancel).await?;

        match reply {
            Ok(reply) => {
                let label = CoarseLabel::parse(&reply.text);
                if label.is_none() {
                    warn!(client = llm.name(), "router classifier returned an unknown label");
                }
                Ok(label)
            }
            Err(error) => {
                warn!(client = llm.name(), kind = error.kind(), "router classifier failed");
                Ok(None)
            }
        }
    }

    fn from_label(label: CoarseLabel, text: &str) -> RouterOutput {
        match label {
            CoarseLabel::Chat => RouterOutput::new(Intent::ChatOnly, LLM_CONFIDENCE, RouteSource::Llm),
            CoarseLabel::Search => {
                RouterOutput::new(Intent::WebSearch, LLM_CONFIDENCE, RouteSource::Llm)
            }
            CoarseLabel::Tool => match heuristics::refine_tool_intent(text) {
                Some((intent, kind)) => {
                    let output = RouterOutput::new(intent, LLM_CONFIDENCE, RouteSource::Llm);
                    match kind {
                        Some(kind) => output.with_memory_write(kind),
                        None => output,
                    }
                }
                None => {
                    let mut output = RouterOutput::new(FALLBACK_INTENT, LLM_CONFIDENCE, RouteSource::Llm);
                    // The fallback row only gets web search when the router asks for it.
                    output.needs.web = heuristics::is_web_search(text, Strictness::Relaxed);
                    output
                }
            },
        }
    }

    /// Model unavailable: rerun the search and memory matchers relaxed, else chat.
    fn fallback(text: &str) -> RouterOutput {
        if heuristics::is_web_search(text, Strictness::Relaxed) {
            return RouterOutput::new(Intent::WebSearch, RELAXED_CONFIDENCE, RouteSource::Fallback);
        }
        if let Some(kind) = heuristics::memory_write_kind(text, Strictness::Relaxed) {
            return RouterOutput::new(Intent::MemoryWrite, RELAXED_CONFIDENCE, RouteSource::Fallback)
                .with_memory_write(kind);
        }
        RouterOutput::new(Intent::ChatOnly, DEFAULT_CHAT_CONFIDENCE, RouteSource::Fallback)
    }
}
