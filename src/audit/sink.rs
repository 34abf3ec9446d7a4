//! Audit sink implementations.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use crate::domain::{AuditEntry, AuditError};

/// Pluggable storage for audit entries.
///
/// The trait is object-safe for use behind `Arc<dyn AuditSink>`.
pub trait AuditSink: Send + Sync {
    /// Persist a single entry.
    fn write_entry(&self, entry: &AuditEntry) -> Result<(), AuditError>;

    /// Every persisted entry, in append order.
    fn entries(&self) -> Result<Vec<AuditEntry>, AuditError>;
}

/// Keeps entries in process memory.
#[derive(Default)]
pub struct MemoryAuditSink {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditSink for MemoryAuditSink {
    fn write_entry(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}

/// Appends one JSON document per line to a journal file and serves reads
/// from an in-memory replica loaded at open.
pub struct JsonlAuditSink {
    path: PathBuf,
    file: Mutex<File>,
    replica: RwLock<Vec<AuditEntry>>,
}

impl JsonlAuditSink {
    /// Open (or create) the journal and replay existing lines.
    ///
    /// Lines that fail to decode are skipped with a warning.
    pub fn open(path: &Path) -> Result<Self, AuditError> {
        let mut replica = Vec::new();
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<AuditEntry>(&line) {
                    Ok(entry) => replica.push(entry),
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Skipping malformed audit journal line"
                    ),
                }
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::info!(path = %path.display(), entries = replica.len(), "Opened audit journal");

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            replica: RwLock::new(replica),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn write_entry(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        {
            let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
            file.write_all(&line)?;
            file.flush()?;
        }
        self.replica
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        Ok(self
            .replica
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
