use crate::llm::ToolCallRequest;
use crate::tools::{Capability, ToolCapabilityRegistry, canonical_tool_name};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;
use strum::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ConflictReason {
    ExplicitUserRequest,
    LowerRisk,
    DeterministicPriority,
    PolicyForbid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedToolCall {
    pub call: ToolCallRequest,
    pub winner: Option<String>,
    pub reason: ConflictReason,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolConflictResolution {
    pub winners: Vec<ToolCallRequest>,
    pub skipped: Vec<SkippedToolCall>,
}

/// Capability pairs that must not both run in the turn that requested them.
/// Unordered.
const CONFLICT_PAIRS: &[(Capability, Capability)] = &[
    (Capability::WebSearch, Capability::SystemExecute),
    (Capability::WebSearch, Capability::MemoryWrite),
    (Capability::WebSearch, Capability::FileWrite),
    (Capability::WebSearch, Capability::FileRead),
    (Capability::WebSearch, Capability::ScreenCapture),
    (Capability::BrowserNavigate, Capability::SystemExecute),
    (Capability::BrowserNavigate, Capability::MemoryWrite),
    (Capability::BrowserNavigate, Capability::FileWrite),
    (Capability::BrowserNavigate, Capability::FileRead),
    (Capability::BrowserNavigate, Capability::ScreenCapture),
    (Capability::ScreenCapture, Capability::SystemExecute),
    (Capability::FileWrite, Capability::SystemExecute),
    (Capability::MemoryWrite, Capability::SystemExecute),
    (Capability::MemoryWrite, Capability::FileWrite),
    (Capability::SystemExecute, Capability::SystemExecute),
];

struct ToolOverride {
    first: &'static str,
    second: &'static str,
    winner: &'static str,
    reason: ConflictReason,
    detail: &'static str,
}

/// Exact-name rules checked before the capability table. Names are canonical.
const TOOL_OVERRIDES: &[ToolOverride] = &[
    ToolOverride {
        first: "memory_store",
        second: "memory_forget",
        winner: "memory_forget",
        reason: ConflictReason::ExplicitUserRequest,
        detail: "a revocation supersedes a store in the same turn",
    },
    ToolOverride {
        first: "remember",
        second: "memory_forget",
        winner: "memory_forget",
        reason: ConflictReason::ExplicitUserRequest,
        detail: "a revocation supersedes a store in the same turn",
    },
    ToolOverride {
        first: "screenshot",
        second: "screen_ocr",
        winner: "screen_ocr",
        reason: ConflictReason::DeterministicPriority,
        detail: "screen_ocr already captures the screen",
    },
];

struct Verdict {
    existing_wins: bool,
    reason: ConflictReason,
    detail: String,
}

/// Drops tool calls whose capabilities are unsafe to run together in one
/// round. Deterministic: identical inputs give identical outputs.
#[derive(Debug, Clone)]
pub struct ToolConflictMatrix {
    registry: Arc<ToolCapabilityRegistry>,
}

impl ToolConflictMatrix {
    pub fn new(registry: Arc<ToolCapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn capabilities_conflict(a: Capability, b: Capability) -> bool {
        CONFLICT_PAIRS
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    pub fn resolve_turn(
        &self,
        calls: &[ToolCallRequest],
        allowed_tools: &BTreeSet<String>,
    ) -> ToolConflictResolution {
        let allowed: BTreeSet<String> = allowed_tools
            .iter()
            .map(|name| canonical_tool_name(name))
            .collect();
        let mut resolution = ToolConflictResolution::default();

        'candidates: for candidate in calls {
            if !allowed.contains(&canonical_tool_name(&candidate.name)) {
                debug!(tool = %candidate.name, reason = %ConflictReason::PolicyForbid, "tool.conflict_skip");
                resolution.skipped.push(SkippedToolCall {
                    call: candidate.clone(),
                    winner: None,
                    reason: ConflictReason::PolicyForbid,
                    detail: format!("{} is not allowed for this turn", candidate.name),
                });
                continue;
            }

            let mut idx = 0;
            while idx < resolution.winners.len() {
                let existing = &resolution.winners[idx];
                let Some(verdict) = self.compare(existing, candidate) else {
                    idx += 1;
                    continue;
                };

                if verdict.existing_wins {
                    debug!(tool = %candidate.name, winner = %existing.name, reason = %verdict.reason, "tool.conflict_skip");
                    resolution.skipped.push(SkippedToolCall {
                        call: candidate.clone(),
                        winner: Some(existing.name.clone()),
                        reason: verdict.reason,
                        detail: verdict.detail,
                    });
                    continue 'candidates;
                }

                let loser = resolution.winners.remove(idx);
                debug!(tool = %loser.name, winner = %candidate.name, reason = %verdict.reason, "tool.conflict_skip");
                resolution.skipped.push(SkippedToolCall {
                    call: loser,
                    winner: Some(candidate.name.clone()),
                    reason: verdict.reason,
                    detail: verdict.detail,
                });
            }
            resolution.winners.push(candidate.clone());
        }

        resolution
    }

    fn compare(&self, existing: &ToolCallRequest, candidate: &ToolCallRequest) -> Option<Verdict> {
        let existing_name = canonical_tool_name(&existing.name);
        let candidate_name = canonical_tool_name(&candidate.name);

        if let Some(rule) = TOOL_OVERRIDES.iter().find(|rule| {
            (rule.first == existing_name && rule.second == candidate_name)
                || (rule.first == candidate_name && rule.second == existing_name)
        }) {
            return Some(Verdict {
                existing_wins: rule.winner == existing_name,
                reason: rule.reason,
                detail: rule.detail.to_string(),
            });
        }

        let existing_cap = self.registry.resolve(&existing.name)?;
        let candidate_cap = self.registry.resolve(&candidate.name)?;
        if !Self::capabilities_conflict(existing_cap, candidate_cap) {
            return None;
        }

        let by_risk = existing_cap
            .risk_priority()
            .cmp(&candidate_cap.risk_priority());
        let (existing_wins, reason) = match by_risk {
            Ordering::Less => (true, ConflictReason::LowerRisk),
            Ordering::Greater => (false, ConflictReason::LowerRisk),
            // Equal names keep the earlier call.
            Ordering::Equal => (
                existing.name <= candidate.name,
                ConflictReason::DeterministicPriority,
            ),
        };

        let (winner, winner_cap, loser, loser_cap) = if existing_wins {
            (existing, existing_cap, candidate, candidate_cap)
        } else {
            (candidate, candidate_cap, existing, existing_cap)
        };
        let detail = match reason {
            ConflictReason::LowerRisk => format!(
                "{} ({loser_cap}, priority {}) conflicts with {} ({winner_cap}, priority {}); the lower-risk call runs",
                loser.name,
                loser_cap.risk_priority(),
                winner.name,
                winner_cap.risk_priority(),
            ),
            _ => format!(
                "{} ({loser_cap}) ties with {} ({winner_cap}); the lexicographically smaller name runs",
                loser.name, winner.name,
            ),
        };

        Some(Verdict {
            existing_wins,
            reason,
            detail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn matrix() -> ToolConflictMatrix {
        ToolConflictMatrix::new(Arc::new(ToolCapabilityRegistry::new()))
    }

    fn call(id: &str, name: &str) -> ToolCallRequest {
        ToolCallRequest::new(id, name, json!({}))
    }

    fn allow(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn web_search_beats_system_execute() {
        let calls = vec![call("1", "web_search"), call("2", "shell")];
        let out = matrix().resolve_turn(&calls, &allow(&["web_search", "shell"]));

        assert_eq!(out.winners, vec![call("1", "web_search")]);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].call.name, "shell");
        assert_eq!(out.skipped[0].reason, ConflictReason::LowerRisk);
        assert_eq!(out.skipped[0].winner.as_deref(), Some("web_search"));
    }

    #[test]
    fn later_safer_call_displaces_earlier_winner() {
        let calls = vec![call("1", "shell"), call("2", "web_search")];
        let out = matrix().resolve_turn(&calls, &allow(&["web_search", "shell"]));
        assert_eq!(out.winners, vec![call("2", "web_search")]);
        assert_eq!(out.skipped[0].call.name, "shell");
        assert_eq!(out.skipped[0].reason, ConflictReason::LowerRisk);
    }

    #[test]
    fn disallowed_call_is_policy_forbid() {
        let calls = vec![call("1", "shell"), call("2", "calculator")];
        let out = matrix().resolve_turn(&calls, &allow(&["calculator"]));
        assert_eq!(out.winners, vec![call("2", "calculator")]);
        assert_eq!(out.skipped[0].reason, ConflictReason::PolicyForbid);
        assert_eq!(out.skipped[0].winner, None);
    }

    #[test]
    fn compatible_calls_coexist() {
        let calls = vec![call("1", "web_search"), call("2", "get_time"), call("3", "calculator")];
        let out = matrix().resolve_turn(&calls, &allow(&["web_search", "get_time", "calculator"]));
        assert_eq!(out.winners.len(), 3);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn equal_priority_tie_prefers_smaller_name() {
        let calls = vec![call("1", "write_file"), call("2", "memory_store")];
        let out = matrix().resolve_turn(&calls, &allow(&["write_file", "memory_store"]));
        assert_eq!(out.winners, vec![call("2", "memory_store")]);
        assert_eq!(out.skipped[0].reason, ConflictReason::DeterministicPriority);
    }

    #[test]
    fn two_shell_calls_keep_the_first() {
        let calls = vec![call("1", "shell"), call("2", "shell")];
        let out = matrix().resolve_turn(&calls, &allow(&["shell"]));
        assert_eq!(out.winners, vec![call("1", "shell")]);
        assert_eq!(out.skipped[0].call.id, "2");
    }

    #[test]
    fn override_table_checked_first() {
        let calls = vec![call("1", "memory_store"), call("2", "MemoryForget")];
        let out = matrix().resolve_turn(&calls, &allow(&["memory_store", "memory_forget"]));
        assert_eq!(out.winners, vec![call("2", "MemoryForget")]);
        assert_eq!(out.skipped[0].reason, ConflictReason::ExplicitUserRequest);
    }

    #[test]
    fn candidate_compared_against_all_remaining_winners() {
        // calculator and shell coexist; web_search then evicts shell only.
        let calls = vec![call("1", "calculator"), call("2", "shell"), call("3", "web_search")];
        let out = matrix().resolve_turn(&calls, &allow(&["calculator", "shell", "web_search"]));
        let names: Vec<&str> = out.winners.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["calculator", "web_search"]);
    }

    #[test]
    fn unmapped_allowed_tool_never_conflicts() {
        let calls = vec![call("1", "news_digest"), call("2", "shell")];
        let out = matrix().resolve_turn(&calls, &allow(&["news_digest", "shell"]));
        assert_eq!(out.winners.len(), 2);
    }

    #[test]
    fn reason_codes_render_kebab_case() {
        assert_eq!(ConflictReason::LowerRisk.to_string(), "lower-risk");
        assert_eq!(ConflictReason::PolicyForbid.to_string(), "policy-forbid");
        let json = serde_json::to_string(&ConflictReason::ExplicitUserRequest).unwrap();
        assert_eq!(json, "\"explicit-user-request\"");
    }
}
