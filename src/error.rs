use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `turngate`.
///
/// Almost nothing in a turn is allowed to fail: routing and guardrails absorb
/// their own failures into fallbacks. What remains is configuration trouble
/// and caller cancellation.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Cancellation ─────────────────────────────────────────────────────
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Cancellation ────────────────────────────────────────────────────────────

/// The caller cancelled the turn. Distinct from a stage timeout, which is
/// always absorbed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("turn cancelled by caller")]
pub struct Cancelled;

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Guardrails stage errors ─────────────────────────────────────────────────

/// Why a single LLM-backed stage produced nothing usable. Never escapes the
/// stage boundary; it only selects the fallback path and feeds the audit log.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage {stage} timed out after {budget_ms}ms")]
    Timeout { stage: String, budget_ms: u64 },

    #[error("stage {stage} failed: {message}")]
    Failed { stage: String, message: String },

    #[error("stage {stage} returned malformed output: {message}")]
    Malformed { stage: String, message: String },
}

impl StageError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Failed { .. } => "failed",
            Self::Malformed { .. } => "malformed",
        }
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CoreError>;
