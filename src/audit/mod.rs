//! Audit log sink.
//!
//! # Data Flow
//! ```text
//! business operation / request observer
//!     → AuditLog::append (stamps id, time, sequence)
//!     → AuditSink::write_entry (memory or JSONL journal)
//!     → on failure: tracing::error! + metric, entry dropped
//! ```
//!
//! # Design Decisions
//! - Appends are best-effort: a sink failure never fails the triggering operation
//! - Entries are never mutated or removed once written
//! - Sinks are pluggable behind `Arc<dyn AuditSink>`

pub mod log;
pub mod sink;

pub use log::AuditLog;
pub use sink::{AuditSink, JsonlAuditSink, MemoryAuditSink};
