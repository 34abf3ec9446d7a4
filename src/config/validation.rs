//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, capacities >= 1, addresses parse)
//! - Detect duplicate room seeds and tokens
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: OccupancyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::OccupancyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &OccupancyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.storage.write_through && config.storage.snapshot_path.is_none() {
        errors.push(ValidationError::new(
            "storage.write_through",
            "requires storage.snapshot_path",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    let mut names = HashSet::new();
    for (i, seed) in config.rooms.iter().enumerate() {
        let name = seed.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(format!("rooms[{i}].name"), "must not be empty"));
        } else if !names.insert(name) {
            errors.push(ValidationError::new(
                format!("rooms[{i}].name"),
                format!("duplicate room '{name}'"),
            ));
        }
        if seed.capacity == 0 {
            errors.push(ValidationError::new(format!("rooms[{i}].capacity"), "must be at least 1"));
        }
    }

    let mut tokens = HashSet::new();
    for (i, token) in config.auth.tokens.iter().enumerate() {
        if token.token.is_empty() {
            errors.push(ValidationError::new(format!("auth.tokens[{i}].token"), "must not be empty"));
        } else if !tokens.insert(token.token.as_str()) {
            errors.push(ValidationError::new(format!("auth.tokens[{i}].token"), "duplicate token"));
        }
        if token.subject.trim().is_empty() {
            errors.push(ValidationError::new(format!("auth.tokens[{i}].subject"), "must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
