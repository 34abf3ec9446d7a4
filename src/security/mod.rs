//! Security subsystem.
//!
//! # Responsibilities
//! - Resolve bearer tokens to caller identities (access_control.rs)
//! - Reject unauthenticated requests before they reach handlers
//!
//! # Design Decisions
//! - Identity is opaque to the core: the subject id is only recorded as
//!   `createdBy` / `actorId`
//! - Credential storage and token issuance live outside this service

pub mod access_control;

pub use access_control::{access_control_middleware, AccessControlState, Caller, CallerSlot};
