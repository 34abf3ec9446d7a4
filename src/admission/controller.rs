//! Check-in and checkout against room capacity.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::domain::{
    NewVisitor, OccupancyError, OccupancyResult, RoomId, Visit, VisitId, VisitorInput,
};
use crate::observability::metrics;
use crate::storage::{CheckOut, Store};

/// Result of a successful checkout call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutOutcome {
    CheckedOut(Visit),
    /// The visit had already been closed; its original checkout time is kept.
    AlreadyCheckedOut(Visit),
}

impl CheckOutOutcome {
    pub fn visit(&self) -> &Visit {
        match self {
            CheckOutOutcome::CheckedOut(v) | CheckOutOutcome::AlreadyCheckedOut(v) => v,
        }
    }
}

/// Decides whether visitors may enter a room.
#[derive(Clone)]
pub struct AdmissionController {
    store: Arc<Store>,
    audit: AuditLog,
}

impl AdmissionController {
    pub fn new(store: Arc<Store>, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    /// Validate visitor data, then admit the visitor if a slot is free.
    ///
    /// # Errors
    ///
    /// - `Validation` if the visitor data is malformed
    /// - `RoomNotFound` if the room does not exist
    /// - `RoomAtCapacity` if every slot is taken
    /// - `Storage` if the visit could not be committed
    pub async fn check_in(
        &self,
        room_id: RoomId,
        visitor: VisitorInput,
        actor: Option<&str>,
    ) -> OccupancyResult<Visit> {
        let visitor = visitor.validate()?;
        self.admit(room_id, visitor, actor).await
    }

    /// Admit an already validated visitor into a room if a slot is free.
    pub async fn admit(
        &self,
        room_id: RoomId,
        visitor: NewVisitor,
        actor: Option<&str>,
    ) -> OccupancyResult<Visit> {
        if self.store.room(&room_id).is_none() {
            return Err(OccupancyError::RoomNotFound(room_id.to_string()));
        }

        let guard = self.store.lock_room(room_id).await;

        // Capacity may have changed while waiting for the lock.
        let room = self
            .store
            .room(&room_id)
            .ok_or_else(|| OccupancyError::RoomNotFound(room_id.to_string()))?;
        let current = self.store.count_active(&room_id);
        if current >= room.capacity as usize {
            drop(guard);
            tracing::info!(
                room_id = %room_id,
                room = %room.name,
                current,
                capacity = room.capacity,
                "Check-in rejected: room at capacity"
            );
            metrics::record_checkin("at_capacity");
            return Err(OccupancyError::RoomAtCapacity {
                current,
                capacity: room.capacity,
            });
        }

        let visit = Visit {
            id: Uuid::new_v4(),
            name: visitor.name,
            cpf: visitor.cpf,
            email: visitor.email,
            birth_date: visitor.birth_date,
            room_id,
            check_in_at: Utc::now(),
            check_out_at: None,
            created_by: actor.map(str::to_string),
            seq: 0,
        };
        let visit = self.store.insert_visit(&guard, visit).await?;
        metrics::record_room_occupancy(&room.name, current + 1);
        drop(guard);

        metrics::record_checkin("admitted");
        tracing::info!(
            visit_id = %visit.id,
            room_id = %room_id,
            occupancy = current + 1,
            capacity = room.capacity,
            "Visitor checked in"
        );

        self.audit.info(
            "Check-in completed",
            json!({
                "action": "visit.checkin",
                "visitId": visit.id,
                "roomId": room_id,
                "actorId": actor,
                "visitorName": visit.name,
            }),
        );

        Ok(visit)
    }

    /// Close an active visit under its room's admission lock.
    ///
    /// Closing an already-closed visit succeeds without changing it and
    /// without a second audit entry.
    pub async fn check_out(&self, visit_id: VisitId, actor: Option<&str>) -> OccupancyResult<CheckOutOutcome> {
        let room_id = self.visit(visit_id)?.room_id;
        let guard = self.store.lock_room(room_id).await;

        match self.store.check_out(&guard, &visit_id, Utc::now()).await? {
            CheckOut::Completed(visit) => {
                if let Some(room) = self.store.room(&room_id) {
                    metrics::record_room_occupancy(&room.name, self.store.count_active(&room_id));
                }
                drop(guard);

                metrics::record_checkout();
                tracing::info!(visit_id = %visit.id, room_id = %visit.room_id, "Visitor checked out");

                self.audit.info(
                    "Check-out completed",
                    json!({
                        "action": "visit.checkout",
                        "visitId": visit.id,
                        "roomId": visit.room_id,
                        "actorId": actor,
                    }),
                );
                Ok(CheckOutOutcome::CheckedOut(visit))
            }
            CheckOut::AlreadyCheckedOut(visit) => {
                tracing::debug!(visit_id = %visit.id, "Visit already checked out");
                Ok(CheckOutOutcome::AlreadyCheckedOut(visit))
            }
        }
    }

    /// Look up a single visit.
    pub fn visit(&self, visit_id: VisitId) -> OccupancyResult<Visit> {
        self.store
            .visit(&visit_id)
            .ok_or_else(|| OccupancyError::VisitNotFound(visit_id.to_string()))
    }
}
