use super::intent::Intent;
use crate::tools::{Capability, PermissionCapability};

/// Entry used for any intent label the table does not name.
pub const FALLBACK_INTENT: Intent = Intent::GeneralTool;

/// One row of the static per-intent policy table.
#[derive(Debug)]
pub struct PolicyEntry {
    pub intent: Intent,
    pub allowed: &'static [Capability],
    /// Removed after `allowed` is applied.
    pub forbidden: &'static [Capability],
    /// Tool names admitted even when the registry does not know them.
    pub allow_tools: &'static [&'static str],
    /// Tool names removed unconditionally.
    pub forbid_tools: &'static [&'static str],
    pub permissions: &'static [PermissionCapability],
    pub use_tool_loop: bool,
}

use Capability as C;
use PermissionCapability as P;

static POLICY_TABLE: &[PolicyEntry] = &[
    PolicyEntry {
        intent: Intent::ChatOnly,
        allowed: &[],
        forbidden: &[],
        allow_tools: &[],
        forbid_tools: &[],
        permissions: &[],
        use_tool_loop: false,
    },
    PolicyEntry {
        intent: Intent::WebSearch,
        allowed: &[C::WebSearch, C::BrowserNavigate, C::TimeRead, C::Meta],
        forbidden: &[C::SystemExecute, C::FileWrite, C::MemoryWrite],
        allow_tools: &["news_digest"],
        forbid_tools: &[],
        permissions: &[P::WebAccess, P::BrowserControl],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::BrowseOnce,
        allowed: &[C::BrowserNavigate, C::TimeRead, C::Meta],
        forbidden: &[C::SystemExecute, C::FileWrite, C::MemoryWrite],
        allow_tools: &[],
        forbid_tools: &[],
        permissions: &[P::BrowserControl],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::MemoryWrite,
        allowed: &[C::MemoryWrite, C::MemoryRead, C::Meta],
        forbidden: &[C::WebSearch, C::SystemExecute],
        allow_tools: &[],
        forbid_tools: &["memory_governance"],
        permissions: &[P::MemoryWrite, P::MemoryRead],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::MemoryRead,
        allowed: &[C::MemoryRead, C::Meta],
        forbidden: &[],
        allow_tools: &[],
        forbid_tools: &[],
        permissions: &[P::MemoryRead],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::ScreenObserve,
        allowed: &[C::ScreenCapture, C::Meta],
        forbidden: &[C::WebSearch, C::BrowserNavigate],
        allow_tools: &[],
        forbid_tools: &[],
        permissions: &[P::ScreenRead],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::FileTask,
        allowed: &[C::FileRead, C::FileWrite, C::Meta],
        forbidden: &[C::SystemExecute],
        allow_tools: &[],
        forbid_tools: &["delete_file"],
        permissions: &[P::FileAccess],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::SystemTask,
        allowed: &[C::SystemExecute, C::FileRead, C::Meta],
        forbidden: &[C::WebSearch, C::MemoryWrite],
        allow_tools: &[],
        forbid_tools: &[],
        permissions: &[P::SystemExecute, P::FileAccess],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::TimeQuery,
        allowed: &[C::TimeRead, C::Meta],
        forbidden: &[],
        allow_tools: &[],
        forbid_tools: &[],
        permissions: &[],
        use_tool_loop: true,
    },
    PolicyEntry {
        intent: Intent::GeneralTool,
        allowed: &[
            C::Meta,
            C::TimeRead,
            C::MemoryRead,
            C::MemoryWrite,
            C::FileRead,
            C::FileWrite,
            C::BrowserNavigate,
            C::ScreenCapture,
            C::SystemExecute,
        ],
        forbidden: &[],
        allow_tools: &[],
        forbid_tools: &["memory_governance"],
        permissions: &[
            P::MemoryRead,
            P::MemoryWrite,
            P::FileAccess,
            P::BrowserControl,
            P::ScreenRead,
            P::SystemExecute,
            P::WebAccess,
        ],
        use_tool_loop: true,
    },
];

pub fn lookup(intent: Intent) -> &'static PolicyEntry {
    POLICY_TABLE
        .iter()
        .find(|entry| entry.intent == intent)
        .unwrap_or_else(fallback_entry)
}

/// String-keyed lookup for intent labels from outside the type system.
pub fn lookup_label(label: &str) -> &'static PolicyEntry {
    lookup(Intent::parse_or_fallback(label))
}

fn fallback_entry() -> &'static PolicyEntry {
    // The table always carries the fallback row; checked by tests.
    POLICY_TABLE
        .iter()
        .find(|entry| entry.intent == FALLBACK_INTENT)
        .unwrap_or(&POLICY_TABLE[POLICY_TABLE.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_intent_has_exactly_one_row() {
        for intent in Intent::ALL {
            let rows = POLICY_TABLE.iter().filter(|e| e.intent == intent).count();
            assert_eq!(rows, 1, "{intent}");
        }
    }

    #[test]
    fn chat_only_grants_nothing() {
        let entry = lookup(Intent::ChatOnly);
        assert!(entry.allowed.is_empty());
        assert!(!entry.use_tool_loop);
    }

    #[test]
    fn unknown_label_resolves_to_fallback_row() {
        assert_eq!(lookup_label("quantum_task").intent, FALLBACK_INTENT);
        assert_eq!(lookup_label("file_task").intent, Intent::FileTask);
    }

    #[test]
    fn fallback_row_excludes_web_search_until_needed() {
        let entry = lookup(FALLBACK_INTENT);
        assert!(!entry.allowed.contains(&Capability::WebSearch));
        assert!(entry.allowed.contains(&Capability::SystemExecute));
    }

    #[test]
    fn forbidden_never_overlaps_allowed_in_table() {
        for entry in POLICY_TABLE {
            for cap in entry.forbidden {
                assert!(
                    !entry.allowed.contains(cap),
                    "{} both allows and forbids {cap}",
                    entry.intent
                );
            }
        }
    }
}
