//! Room registry administration: creation, capacity updates and startup seeding.

use serde_json::json;
use std::sync::Arc;

use crate::audit::AuditLog;
use crate::config::RoomSeed;
use crate::domain::{OccupancyError, OccupancyResult, Room, RoomId};
use crate::storage::Store;

/// Administrative operations on rooms.
#[derive(Clone)]
pub struct RoomRegistry {
    store: Arc<Store>,
    audit: AuditLog,
}

impl RoomRegistry {
    pub fn new(store: Arc<Store>, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    /// Register a new room.
    pub async fn create_room(
        &self,
        name: &str,
        capacity: i64,
        actor: Option<&str>,
    ) -> OccupancyResult<Room> {
        let name = Room::validate_name(name)?;
        let capacity = Room::validate_capacity(capacity)?;
        let room = self.store.insert_room(name, capacity).await?;

        tracing::info!(room_id = %room.id, room = %room.name, capacity, "Room created");
        self.audit.info(
            "Room created",
            json!({
                "action": "room.create",
                "roomId": room.id,
                "name": room.name,
                "capacity": room.capacity,
                "actorId": actor,
            }),
        );
        Ok(room)
    }

    /// Change a room's capacity.
    ///
    /// Serialized with admissions on the same room. Lowering capacity below
    /// the current occupancy keeps existing visits; new check-ins are refused
    /// until enough visitors leave.
    pub async fn update_capacity(
        &self,
        room_id: RoomId,
        capacity: i64,
        actor: Option<&str>,
    ) -> OccupancyResult<Room> {
        let capacity = Room::validate_capacity(capacity)?;
        let previous = self
            .store
            .room(&room_id)
            .ok_or_else(|| OccupancyError::RoomNotFound(room_id.to_string()))?;

        let guard = self.store.lock_room(room_id).await;
        let room = self.store.set_room_capacity(&guard, capacity).await?;
        drop(guard);

        tracing::info!(
            room_id = %room.id,
            from = previous.capacity,
            to = room.capacity,
            "Room capacity updated"
        );
        self.audit.info(
            "Room capacity updated",
            json!({
                "action": "room.update",
                "roomId": room.id,
                "previousCapacity": previous.capacity,
                "capacity": room.capacity,
                "actorId": actor,
            }),
        );
        Ok(room)
    }

    /// Create missing seed rooms and align capacities of existing ones.
    pub async fn seed(&self, seeds: &[RoomSeed]) -> OccupancyResult<usize> {
        for seed in seeds {
            let name = Room::validate_name(&seed.name)?;
            match self.store.room_by_name(&name) {
                Some(room) if room.capacity == seed.capacity => {}
                Some(room) => {
                    self.update_capacity(room.id, i64::from(seed.capacity), None).await?;
                }
                None => {
                    self.create_room(&name, i64::from(seed.capacity), None).await?;
                }
            }
        }

        if !seeds.is_empty() {
            self.audit.info(
                "System initialized with seed data",
                json!({ "action": "system.seed", "rooms": seeds.len() }),
            );
        }
        Ok(seeds.len())
    }
}
