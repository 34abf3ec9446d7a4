//! Room types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{OccupancyError, OccupancyResult};

pub type RoomId = Uuid;

/// A physical room with a fixed number of visitor slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

impl Room {
    /// Validate a requested capacity. Rooms always hold at least one visitor.
    pub fn validate_capacity(capacity: i64) -> OccupancyResult<u32> {
        u32::try_from(capacity)
            .ok()
            .filter(|c| *c >= 1)
            .ok_or_else(|| {
                OccupancyError::validation(format!("Capacity must be at least 1, got {capacity}"))
            })
    }

    /// Validate and trim a room name.
    pub fn validate_name(name: &str) -> OccupancyResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OccupancyError::validation("Room name must not be empty"));
        }
        Ok(name.to_string())
    }
}

/// A room together with its current number of active visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomOccupancy {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub active_count: usize,
}
