//! Persistent room and visit state.
//!
//! # Data Flow
//! ```text
//! startup:   snapshot file ──▶ Store (rooms + visits in memory)
//! mutation:  staged snapshot ──(write_through)──▶ snapshot file ──▶ Store maps
//! shutdown:  Store ──▶ snapshot file
//! ```
//!
//! # Design Decisions
//! - Rooms and visits live in concurrent maps; reads never block writers for long
//! - Check-ins and checkouts serialize per room through an async mutex keyed by room id
//! - The store is handed to components explicitly, never reached globally

pub mod snapshot;
pub mod store;

pub use snapshot::Snapshot;
pub use store::{AdmissionGuard, CheckOut, Store};
