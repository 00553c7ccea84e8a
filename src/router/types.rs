use crate::policy::{FALLBACK_INTENT, Intent};
use crate::tools::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::Display;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Lenient parse for model output; unknown labels are `None`.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" | "none" => Some(Self::Low),
            "medium" | "moderate" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Which rule produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RouteSource {
    FastPath,
    Heuristic,
    Llm,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MemoryWriteKind {
    Store,
    Correct,
    Revoke,
}

/// The turn refers back to something the orchestrator still holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FollowUp {
    SearchResults,
    Rationale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeedFlags {
    pub web: bool,
    pub browser: bool,
    pub search: bool,
    pub memory_read: bool,
    pub memory_write: bool,
    pub file: bool,
    pub screen: bool,
    pub system_execute: bool,
}

impl NeedFlags {
    pub fn for_intent(intent: Intent) -> Self {
        let mut needs = Self::default();
        match intent {
            Intent::ChatOnly | Intent::TimeQuery | Intent::GeneralTool => {}
            Intent::WebSearch => {
                needs.web = true;
                needs.search = true;
            }
            Intent::BrowseOnce => {
                needs.web = true;
                needs.browser = true;
            }
            Intent::MemoryWrite => needs.memory_write = true,
            Intent::MemoryRead => needs.memory_read = true,
            Intent::ScreenObserve => needs.screen = true,
            Intent::FileTask => needs.file = true,
            Intent::SystemTask => needs.system_execute = true,
        }
        needs
    }

    pub fn wants_web(&self) -> bool {
        self.web || self.search
    }

    /// Capabilities the router explicitly demands. Empty means "no opinion".
    pub fn required_capabilities(&self) -> BTreeSet<Capability> {
        let mut caps = BTreeSet::new();
        if self.search || (self.web && !self.browser) {
            caps.insert(Capability::WebSearch);
        }
        if self.browser {
            caps.insert(Capability::BrowserNavigate);
        }
        if self.memory_read {
            caps.insert(Capability::MemoryRead);
        }
        if self.memory_write {
            caps.insert(Capability::MemoryWrite);
        }
        if self.file {
            caps.insert(Capability::FileRead);
            caps.insert(Capability::FileWrite);
        }
        if self.screen {
            caps.insert(Capability::ScreenCapture);
        }
        if self.system_execute {
            caps.insert(Capability::SystemExecute);
        }
        caps
    }
}

/// Structured classification of one user turn. Built fresh per turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterOutput {
    pub intent: Intent,
    pub confidence: f64,
    pub needs: NeedFlags,
    pub risk: RiskLevel,
    pub source: RouteSource,
    #[serde(default)]
    pub memory_write: Option<MemoryWriteKind>,
    #[serde(default)]
    pub follow_up: Option<FollowUp>,
}

impl RouterOutput {
    pub fn new(intent: Intent, confidence: f64, source: RouteSource) -> Self {
        Self {
            intent,
            confidence: confidence.clamp(0.0, 1.0),
            needs: NeedFlags::for_intent(intent),
            risk: default_risk(intent),
            source,
            memory_write: None,
            follow_up: None,
        }
    }

    pub fn with_memory_write(mut self, kind: MemoryWriteKind) -> Self {
        self.memory_write = Some(kind);
        self
    }

    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }

    /// The fallback intent carries need flags only as hints for the gate;
    /// it never narrows the grant.
    pub fn required_capabilities(&self) -> BTreeSet<Capability> {
        if self.intent == FALLBACK_INTENT {
            return BTreeSet::new();
        }
        self.needs.required_capabilities()
    }
}

fn default_risk(intent: Intent) -> RiskLevel {
    match intent {
        Intent::ChatOnly | Intent::WebSearch | Intent::TimeQuery | Intent::MemoryRead => {
            RiskLevel::Low
        }
        Intent::BrowseOnce | Intent::MemoryWrite | Intent::FileTask | Intent::ScreenObserve => {
            RiskLevel::Medium
        }
        Intent::SystemTask | Intent::GeneralTool => RiskLevel::High,
    }
}

/// Signals the orchestrator passes along with the raw text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterContext {
    pub has_recent_search_results: bool,
    pub has_recent_rationale: bool,
}
