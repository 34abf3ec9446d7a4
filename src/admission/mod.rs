//! Capacity admission control.
//!
//! # Data Flow
//! ```text
//! check-in request
//!     → validate visitor (name, cpf, email)
//!     → resolve room
//!     → lock room ─┐ read capacity, count active visits,
//!                  │ reject at capacity, insert visit
//!     → unlock ────┘
//!     → audit `visit.checkin`
//! ```
//!
//! # Design Decisions
//! - The count and the insert share one per-room critical section, so two
//!   concurrent check-ins for the last slot admit exactly one
//! - Checkouts do not take the lock: they only ever free slots
//! - Re-checkout of a closed visit is an idempotent no-op

pub mod controller;

pub use controller::{AdmissionController, CheckOutOutcome};
