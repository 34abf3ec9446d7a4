//! Audit entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::OccupancyError;

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
}

impl AuditLevel {
    /// Classify a response status: 5xx is an error, 4xx a warning.
    pub fn from_status(status: u16) -> Self {
        match status {
            500.. => AuditLevel::Error,
            400..=499 => AuditLevel::Warn,
            _ => AuditLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLevel::Info => "info",
            AuditLevel::Warn => "warn",
            AuditLevel::Error => "error",
        }
    }
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditLevel {
    type Err = OccupancyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(AuditLevel::Info),
            "warn" => Ok(AuditLevel::Warn),
            "error" => Ok(AuditLevel::Error),
            other => Err(OccupancyError::validation(format!(
                "Invalid level '{other}': expected info, warn or error"
            ))),
        }
    }
}

/// An immutable record of a system event or request outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub level: AuditLevel,
    pub message: String,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Append order within the sink.
    #[serde(default)]
    pub seq: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_status() {
        assert_eq!(AuditLevel::from_status(200), AuditLevel::Info);
        assert_eq!(AuditLevel::from_status(201), AuditLevel::Info);
        assert_eq!(AuditLevel::from_status(301), AuditLevel::Info);
        assert_eq!(AuditLevel::from_status(400), AuditLevel::Warn);
        assert_eq!(AuditLevel::from_status(409), AuditLevel::Warn);
        assert_eq!(AuditLevel::from_status(499), AuditLevel::Warn);
        assert_eq!(AuditLevel::from_status(500), AuditLevel::Error);
        assert_eq!(AuditLevel::from_status(503), AuditLevel::Error);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("WARN".parse::<AuditLevel>().unwrap(), AuditLevel::Warn);
        assert!("debug".parse::<AuditLevel>().is_err());
    }
}
