pub mod classifier;
pub mod heuristics;
pub mod types;

pub use classifier::IntentRouter;
pub use types::{
    FollowUp, MemoryWriteKind, NeedFlags, RiskLevel, RouteSource, RouterContext, RouterOutput,
};
