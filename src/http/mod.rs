//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers)
//!     → request.rs (request id)
//!     → middleware/request_log.rs (audit entry per request)
//!     → security (bearer auth, protected routes only)
//!     → handlers.rs (admission, rooms, queries)
//!     → error.rs (failure → status + `{error, statusCode}`)
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use error::{ApiError, ErrorMessage};
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
