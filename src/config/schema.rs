use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub router: RouterConfig,

    #[serde(default)]
    pub guardrails: GuardrailsConfig,
}

// ── Router ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Run the single-word LLM classifier when no deterministic rule fires.
    #[serde(default = "default_true")]
    pub llm_enabled: bool,
    #[serde(default = "default_router_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_router_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub temperature: f64,
}

fn default_router_max_tokens() -> u32 {
    4
}

fn default_router_timeout_ms() -> u64 {
    1500
}

impl RouterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            llm_enabled: true,
            max_tokens: default_router_max_tokens(),
            timeout_ms: default_router_timeout_ms(),
            temperature: 0.0,
        }
    }
}

// ── Guardrails ──────────────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GuardrailsMode {
    Off,
    #[default]
    Auto,
    Always,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailsConfig {
    #[serde(default)]
    pub mode: GuardrailsMode,
    #[serde(default = "default_trigger_timeout_ms")]
    pub trigger_timeout_ms: u64,
    #[serde(default = "default_stage_timeout_ms")]
    pub stage_timeout_ms: u64,
    /// Ask the small model for a risk verdict when no deterministic cue fires.
    #[serde(default = "default_true")]
    pub tiny_model_trigger: bool,
    #[serde(default = "default_stage_max_tokens")]
    pub stage_max_tokens: u32,
    #[serde(default = "default_true")]
    pub special_cases: bool,
}

fn default_trigger_timeout_ms() -> u64 {
    500
}

fn default_stage_timeout_ms() -> u64 {
    850
}

fn default_stage_max_tokens() -> u32 {
    256
}

impl GuardrailsConfig {
    pub fn trigger_timeout(&self) -> Duration {
        Duration::from_millis(self.trigger_timeout_ms)
    }

    pub fn stage_timeout(&self) -> Duration {
        Duration::from_millis(self.stage_timeout_ms)
    }
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            mode: GuardrailsMode::default(),
            trigger_timeout_ms: default_trigger_timeout_ms(),
            stage_timeout_ms: default_stage_timeout_ms(),
            tiny_model_trigger: true,
            stage_max_tokens: default_stage_max_tokens(),
            special_cases: true,
        }
    }
}
