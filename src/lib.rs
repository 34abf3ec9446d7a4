//! Room occupancy control library.

pub mod admission;
pub mod audit;
pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod observer;
pub mod query;
pub mod rooms;
pub mod security;
pub mod storage;

pub use admission::AdmissionController;
pub use audit::AuditLog;
pub use config::schema::OccupancyConfig;
pub use domain::{OccupancyError, OccupancyResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use query::QueryEngine;
pub use rooms::RoomRegistry;
pub use storage::Store;
