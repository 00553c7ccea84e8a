pub mod conflict;
pub mod gate;
pub mod intent;
pub mod table;

pub use conflict::{ConflictReason, SkippedToolCall, ToolConflictMatrix, ToolConflictResolution};
pub use gate::{CapabilityPolicyGate, PolicyDecision};
pub use intent::Intent;
pub use table::{FALLBACK_INTENT, PolicyEntry};
