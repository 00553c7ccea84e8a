use super::intent::Intent;
use super::table::{self, FALLBACK_INTENT};
use crate::llm::ToolSpec;
use crate::router::RouterOutput;
use crate::tools::{Capability, PermissionCapability, ToolCapabilityRegistry, canonical_tool_name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Capability grant for one turn. Derived purely from the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub intent: Intent,
    pub allowed_capabilities: BTreeSet<Capability>,
    pub forbidden_capabilities: BTreeSet<Capability>,
    pub allow_tools: BTreeSet<String>,
    pub forbid_tools: BTreeSet<String>,
    pub required_permissions: BTreeSet<PermissionCapability>,
    pub use_tool_loop: bool,
    /// The fallback row answered this intent.
    pub used_fallback: bool,
}

impl PolicyDecision {
    /// Allowed minus forbidden.
    pub fn effective_capabilities(&self) -> BTreeSet<Capability> {
        self.allowed_capabilities
            .difference(&self.forbidden_capabilities)
            .copied()
            .collect()
    }

    pub fn permits_tool(&self, registry: &ToolCapabilityRegistry, tool_name: &str) -> bool {
        let canonical = canonical_tool_name(tool_name);
        if self.forbid_tools.contains(&canonical) {
            return false;
        }
        if self.allow_tools.contains(&canonical) {
            return true;
        }
        registry.resolve(tool_name).is_some_and(|cap| {
            self.allowed_capabilities.contains(&cap) && !self.forbidden_capabilities.contains(&cap)
        })
    }
}

/// Pure `Intent × RequiredCapabilities → PolicyDecision`, plus tool-list
/// filtering against the registry.
#[derive(Debug, Clone)]
pub struct CapabilityPolicyGate {
    registry: Arc<ToolCapabilityRegistry>,
}

impl CapabilityPolicyGate {
    pub fn new(registry: Arc<ToolCapabilityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolCapabilityRegistry {
        &self.registry
    }

    pub fn evaluate(&self, route: &RouterOutput) -> PolicyDecision {
        Self::evaluate_parts(
            route.intent,
            &route.required_capabilities(),
            route.needs.wants_web(),
        )
    }

    /// Core lookup. `required` narrows the grant when non-empty; it can never
    /// widen it.
    pub fn evaluate_parts(
        intent: Intent,
        required: &BTreeSet<Capability>,
        wants_web: bool,
    ) -> PolicyDecision {
        let entry = table::lookup(intent);
        let used_fallback = entry.intent == FALLBACK_INTENT;

        let mut allowed: BTreeSet<Capability> = entry.allowed.iter().copied().collect();
        if used_fallback && wants_web {
            allowed.insert(Capability::WebSearch);
        }
        if !required.is_empty() {
            allowed = allowed.intersection(required).copied().collect();
        }

        let forbidden: BTreeSet<Capability> = entry.forbidden.iter().copied().collect();
        let allow_tools: BTreeSet<String> = entry
            .allow_tools
            .iter()
            .map(|t| canonical_tool_name(t))
            .collect();
        let forbid_tools: BTreeSet<String> = entry
            .forbid_tools
            .iter()
            .map(|t| canonical_tool_name(t))
            .collect();

        let granted_permissions: BTreeSet<PermissionCapability> = allowed
            .difference(&forbidden)
            .filter_map(|cap| cap.permission())
            .collect();
        let required_permissions = entry
            .permissions
            .iter()
            .copied()
            .filter(|p| granted_permissions.contains(p))
            .collect();

        let has_any_tool = !allowed.is_subset(&forbidden) || !allow_tools.is_empty();
        let use_tool_loop = entry.use_tool_loop && has_any_tool;

        PolicyDecision {
            intent,
            allowed_capabilities: allowed,
            forbidden_capabilities: forbidden,
            allow_tools,
            forbid_tools,
            required_permissions,
            use_tool_loop,
            used_fallback,
        }
    }

    /// Tool names the decision exposes, keeping input order.
    pub fn filter_tool_names<'a, I>(&self, decision: &PolicyDecision, names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|name| decision.permits_tool(&self.registry, name))
            .collect()
    }

    pub fn filter_tools(&self, decision: &PolicyDecision, specs: &[ToolSpec]) -> Vec<ToolSpec> {
        specs
            .iter()
            .filter(|spec| decision.permits_tool(&self.registry, &spec.name))
            .cloned()
            .collect()
    }

    /// Allowed-name set handed to the conflict matrix for one round.
    pub fn allowed_tool_set(&self, decision: &PolicyDecision, specs: &[ToolSpec]) -> BTreeSet<String> {
        self.filter_tools(decision, specs)
            .into_iter()
            .map(|spec| spec.name)
            .collect()
    }
}
