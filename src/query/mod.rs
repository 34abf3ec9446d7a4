//! Query engine.
//!
//! # Data Flow
//! ```text
//! raw query string
//!     → params.rs (deserialize, validate)
//!     → filter.rs (typed filters: room, search, date range, pagination)
//!     → engine.rs (scan, filter, order newest first, paginate)
//!     → Page<T> { total, page, pageSize, items }
//! ```
//!
//! # Design Decisions
//! - Filters are validated before they reach the engine
//! - An under-specified search term widens the result instead of emptying it
//! - `total` counts every match, independent of the requested page

pub mod engine;
pub mod filter;
pub mod params;

pub use engine::{ActiveVisitor, HistoryItem, LogRow, QueryEngine};
pub use filter::{
    ActiveVisitorsFilter, AuditFilter, DateRange, HistoryFilter, Page, Pagination, SearchFilter,
};
pub use params::{ActiveVisitorsParams, AuditParams, HistoryParams};
