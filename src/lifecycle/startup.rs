//! Startup orchestration.
//!
//! Opens the store and audit journal, builds the server and ensures the
//! configured rooms exist. Any failure here is fatal.

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::audit::{AuditLog, JsonlAuditSink, MemoryAuditSink};
use crate::config::{AuditConfig, OccupancyConfig};
use crate::domain::{AuditError, OccupancyError, StorageError};
use crate::http::HttpServer;
use crate::storage::Store;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to open store: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to open audit journal: {0}")]
    Audit(#[from] AuditError),

    #[error("Failed to seed rooms: {0}")]
    Seed(#[from] OccupancyError),
}

pub fn open_audit(config: &AuditConfig) -> Result<AuditLog, AuditError> {
    match &config.journal_path {
        Some(path) => {
            let sink = JsonlAuditSink::open(Path::new(path))?;
            tracing::info!(path = %path, "Audit journal opened");
            Ok(AuditLog::new(Arc::new(sink)))
        }
        None => Ok(AuditLog::new(Arc::new(MemoryAuditSink::new()))),
    }
}

/// Build a ready-to-run server from `config`.
pub async fn start(config: &OccupancyConfig) -> Result<HttpServer, StartupError> {
    let store = Arc::new(Store::open(&config.storage)?);
    let audit = open_audit(&config.audit)?;

    let server = HttpServer::new(config.clone(), store, audit);
    let seeded = server.state().rooms.seed(&config.rooms).await?;
    tracing::info!(rooms = seeded, "Rooms ready");

    Ok(server)
}
