//! Occupancy domain model.
//!
//! # Entities
//! ```text
//! Room ──< Visit          (a visit occupies one slot of its room while active)
//! AuditEntry              (append-only, referenced by nothing)
//! ```
//!
//! # Design Decisions
//! - Identifiers are UUID v4, generated by the service
//! - National identifiers are stored in canonical digits-only form
//! - Timestamps are UTC

pub mod audit;
pub mod error;
pub mod national_id;
pub mod room;
pub mod visit;

pub use audit::{AuditEntry, AuditLevel};
pub use error::{AuditError, OccupancyError, OccupancyResult, StorageError};
pub use national_id::NationalId;
pub use room::{Room, RoomId, RoomOccupancy};
pub use visit::{NewVisitor, Visit, VisitId, VisitorInput};
