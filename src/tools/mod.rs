pub mod capability;
pub mod executor;
pub mod registry;
pub mod round;

pub use capability::{Capability, PermissionCapability};
pub use executor::ToolExecutor;
pub use registry::{ToolCapabilityRegistry, canonical_tool_name};
pub use round::{RoundReport, ToolCallRecord, ToolRound};
