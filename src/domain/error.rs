//! Error taxonomy for the occupancy core.

use thiserror::Error;

/// Errors surfaced by business operations to the transport boundary.
#[derive(Debug, Error)]
pub enum OccupancyError {
    /// Malformed visitor data or query parameters.
    #[error("{0}")]
    Validation(String),

    /// Room id did not resolve.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// Visit id did not resolve.
    #[error("Visit not found: {0}")]
    VisitNotFound(String),

    /// Every slot of the room is taken.
    #[error("Room at capacity ({current}/{capacity})")]
    RoomAtCapacity { current: usize, capacity: u32 },

    /// Uniqueness violation (e.g. duplicate room name).
    #[error("{0}")]
    Conflict(String),

    /// The store failed to commit.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl OccupancyError {
    /// Shorthand for building a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result alias for occupancy operations.
pub type OccupancyResult<T> = Result<T, OccupancyError>;

/// Failures of the persistent store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures of an audit sink. Never surfaced to callers.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit journal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("audit entry encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}
