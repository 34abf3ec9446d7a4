//! Request observer.
//!
//! # Data Flow
//! ```text
//! Request
//!     → http/middleware/request_log.rs (timing, caller slot, body capture,
//!       panic capture)
//!     → record.rs (level, message, meta)
//!     → audit log (one entry per request)
//! ```
//!
//! # Design Decisions
//! - Excluded paths produce no entry at all
//! - Audit failures never change the response

pub mod record;

pub use record::{truncate_body, Fault, RequestRecord};
