use super::capability::Capability;
use std::collections::{BTreeSet, HashMap};

/// Single source of truth for tool name → capability. Names are stored in
/// canonical snake_case; lookups canonicalize first, so `WebSearch`,
/// `webSearch` and `web-search` all resolve like `web_search`.
const TOOL_CAPABILITIES: &[(&str, Capability)] = &[
    // deterministic / meta
    ("calculator", Capability::Meta),
    ("calculate", Capability::Meta),
    ("unit_convert", Capability::Meta),
    ("echo", Capability::Meta),
    ("noop", Capability::Meta),
    ("get_capabilities", Capability::Meta),
    // time
    ("get_time", Capability::TimeRead),
    ("current_time", Capability::TimeRead),
    ("get_date", Capability::TimeRead),
    ("time_now", Capability::TimeRead),
    // memory
    ("memory_recall", Capability::MemoryRead),
    ("recall_memory", Capability::MemoryRead),
    ("memory_search", Capability::MemoryRead),
    ("search_memory", Capability::MemoryRead),
    ("memory_store", Capability::MemoryWrite),
    ("store_memory", Capability::MemoryWrite),
    ("remember", Capability::MemoryWrite),
    ("memory_update", Capability::MemoryWrite),
    ("memory_forget", Capability::MemoryWrite),
    ("forget_memory", Capability::MemoryWrite),
    ("memory_governance", Capability::MemoryWrite),
    // files
    ("file_read", Capability::FileRead),
    ("read_file", Capability::FileRead),
    ("list_files", Capability::FileRead),
    ("list_directory", Capability::FileRead),
    ("file_search", Capability::FileRead),
    ("file_write", Capability::FileWrite),
    ("write_file", Capability::FileWrite),
    ("edit_file", Capability::FileWrite),
    ("append_file", Capability::FileWrite),
    ("create_file", Capability::FileWrite),
    ("delete_file", Capability::FileWrite),
    // web
    ("web_search", Capability::WebSearch),
    ("search_web", Capability::WebSearch),
    ("internet_search", Capability::WebSearch),
    ("news_search", Capability::WebSearch),
    ("browser", Capability::BrowserNavigate),
    ("browse", Capability::BrowserNavigate),
    ("browser_navigate", Capability::BrowserNavigate),
    ("browser_open", Capability::BrowserNavigate),
    ("open_url", Capability::BrowserNavigate),
    ("fetch_url", Capability::BrowserNavigate),
    ("web_fetch", Capability::BrowserNavigate),
    // screen
    ("screenshot", Capability::ScreenCapture),
    ("capture_screen", Capability::ScreenCapture),
    ("screen_capture", Capability::ScreenCapture),
    ("screen_ocr", Capability::ScreenCapture),
    ("read_screen", Capability::ScreenCapture),
    // system
    ("shell", Capability::SystemExecute),
    ("bash", Capability::SystemExecute),
    ("run_command", Capability::SystemExecute),
    ("execute_command", Capability::SystemExecute),
    ("terminal", Capability::SystemExecute),
    ("kill_process", Capability::SystemExecute),
];

/// Fold PascalCase, camelCase, kebab-case and spaced names into snake_case.
pub fn canonical_tool_name(name: &str) -> String {
    let chars: Vec<char> = name.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '.' || c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
                || (prev.is_some_and(char::is_uppercase) && next.is_some_and(char::is_lowercase));
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Static many-to-one map from tool names to logical capabilities.
/// Unknown names resolve to `None` and are hidden (fail closed).
#[derive(Debug, Clone)]
pub struct ToolCapabilityRegistry {
    map: HashMap<String, Capability>,
}

impl ToolCapabilityRegistry {
    pub fn new() -> Self {
        let map = TOOL_CAPABILITIES
            .iter()
            .map(|(name, cap)| ((*name).to_string(), *cap))
            .collect();
        Self { map }
    }

    /// Register an extra spelling. Later registrations win.
    pub fn with_tool(mut self, name: &str, capability: Capability) -> Self {
        self.map.insert(canonical_tool_name(name), capability);
        self
    }

    pub fn resolve(&self, tool_name: &str) -> Option<Capability> {
        self.map.get(&canonical_tool_name(tool_name)).copied()
    }

    pub fn is_known(&self, tool_name: &str) -> bool {
        self.resolve(tool_name).is_some()
    }

    /// Keep the names whose capability is in `allowed`. Unmapped names drop.
    pub fn filter<'a, I>(&self, tool_names: I, allowed: &BTreeSet<Capability>) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tool_names
            .into_iter()
            .filter(|name| self.resolve(name).is_some_and(|cap| allowed.contains(&cap)))
            .collect()
    }

    /// All registered canonical names for one capability, sorted.
    pub fn names_for(&self, capability: Capability) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .map
            .iter()
            .filter(|(_, cap)| **cap == capability)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
