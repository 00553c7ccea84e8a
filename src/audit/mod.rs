pub mod log;
pub mod memory;
pub mod noop;
pub mod traits;

pub use log::LogAuditSink;
pub use memory::MemoryAuditSink;
pub use noop::NoopAuditSink;
pub use traits::{AuditEvent, AuditSink};
