use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Logical tool category. Every concrete tool name maps onto exactly one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Meta,
    TimeRead,
    MemoryRead,
    MemoryWrite,
    FileRead,
    FileWrite,
    WebSearch,
    BrowserNavigate,
    ScreenCapture,
    SystemExecute,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::Meta,
        Capability::TimeRead,
        Capability::MemoryRead,
        Capability::MemoryWrite,
        Capability::FileRead,
        Capability::FileWrite,
        Capability::WebSearch,
        Capability::BrowserNavigate,
        Capability::ScreenCapture,
        Capability::SystemExecute,
    ];

    /// Fixed risk ordering used by conflict resolution; lower is safer.
    pub fn risk_priority(self) -> u8 {
        match self {
            Self::Meta => 0,
            Self::MemoryRead => 1,
            Self::FileRead | Self::TimeRead => 2,
            Self::WebSearch | Self::BrowserNavigate => 3,
            Self::ScreenCapture => 4,
            Self::MemoryWrite | Self::FileWrite => 5,
            Self::SystemExecute => 6,
        }
    }

    /// Consent scope the permission broker prompts for, if any.
    pub fn permission(self) -> Option<PermissionCapability> {
        match self {
            Self::Meta | Self::TimeRead => None,
            Self::MemoryRead => Some(PermissionCapability::MemoryRead),
            Self::MemoryWrite => Some(PermissionCapability::MemoryWrite),
            Self::FileRead | Self::FileWrite => Some(PermissionCapability::FileAccess),
            Self::WebSearch => Some(PermissionCapability::WebAccess),
            Self::BrowserNavigate => Some(PermissionCapability::BrowserControl),
            Self::ScreenCapture => Some(PermissionCapability::ScreenRead),
            Self::SystemExecute => Some(PermissionCapability::SystemExecute),
        }
    }
}

/// Permission-broker view of capabilities, used for user-facing consent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PermissionCapability {
    ScreenRead,
    BrowserControl,
    Microphone,
    SystemExecute,
    FileAccess,
    WebAccess,
    MemoryRead,
    MemoryWrite,
}
