use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Closed intent taxonomy produced by the router and keyed by the policy table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    ChatOnly,
    WebSearch,
    BrowseOnce,
    MemoryWrite,
    MemoryRead,
    ScreenObserve,
    FileTask,
    SystemTask,
    TimeQuery,
    /// Coarse "needs tools" with no narrower match; broad but still
    /// capability-filtered.
    GeneralTool,
}

impl Intent {
    pub const ALL: [Intent; 10] = [
        Intent::ChatOnly,
        Intent::WebSearch,
        Intent::BrowseOnce,
        Intent::MemoryWrite,
        Intent::MemoryRead,
        Intent::ScreenObserve,
        Intent::FileTask,
        Intent::SystemTask,
        Intent::TimeQuery,
        Intent::GeneralTool,
    ];

    /// Parse an intent label coming from outside the type system. Unknown
    /// labels resolve to [`Intent::GeneralTool`].
    pub fn parse_or_fallback(label: &str) -> Self {
        label
            .trim()
            .to_ascii_lowercase()
            .parse()
            .unwrap_or(super::table::FALLBACK_INTENT)
    }

    /// Routes already committed to a concrete tool family. Guardrails never
    /// intercept these.
    pub fn is_tool_committed(self) -> bool {
        matches!(
            self,
            Self::BrowseOnce
                | Self::MemoryWrite
                | Self::MemoryRead
                | Self::ScreenObserve
                | Self::FileTask
                | Self::SystemTask
        )
    }
}
