//! Best-effort audit front end.

use chrono::Utc;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::audit::sink::{AuditSink, MemoryAuditSink};
use crate::domain::{AuditEntry, AuditLevel};
use crate::observability::metrics;

/// Appends audit entries to a sink, absorbing sink failures.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
    next_seq: Arc<AtomicU64>,
}

impl AuditLog {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        let next_seq = match sink.entries() {
            Ok(entries) => entries.iter().map(|e| e.seq + 1).max().unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read audit sink; sequence restarts at 0");
                0
            }
        };
        Self {
            sink,
            next_seq: Arc::new(AtomicU64::new(next_seq)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryAuditSink::new()))
    }

    /// Record an event. Failures are logged and dropped.
    pub fn append(&self, level: AuditLevel, message: impl Into<String>, meta: Value) {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            meta,
            created_at: Utc::now(),
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        };

        if let Err(e) = self.sink.write_entry(&entry) {
            tracing::error!(
                error = %e,
                level = %entry.level,
                message = %entry.message,
                "Failed to persist audit entry"
            );
            metrics::record_audit_failure();
        }
    }

    pub fn info(&self, message: impl Into<String>, meta: Value) {
        self.append(AuditLevel::Info, message, meta);
    }

    pub fn warn(&self, message: impl Into<String>, meta: Value) {
        self.append(AuditLevel::Warn, message, meta);
    }

    pub fn error(&self, message: impl Into<String>, meta: Value) {
        self.append(AuditLevel::Error, message, meta);
    }

    /// Everything the sink holds. An unreadable sink reads as empty.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.sink.entries().unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to read audit entries");
            Vec::new()
        })
    }
}
