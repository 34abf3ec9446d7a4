//! Room registry and visit ledger.
//!
//! Every mutation runs under one persist lock. With write-through enabled the
//! change is staged into a snapshot and saved first; the maps are only updated
//! once the save succeeded, so readers never see state that is not on disk.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::domain::{
    OccupancyError, OccupancyResult, Room, RoomId, StorageError, Visit, VisitId,
};
use crate::storage::snapshot::Snapshot;

/// Proof that the caller holds a room's admission lock.
///
/// Writes that change a room's occupancy or capacity require one, so the
/// active-count read and the write that depends on it cannot interleave with
/// another admission or checkout for the same room.
pub struct AdmissionGuard {
    room_id: RoomId,
    _guard: OwnedMutexGuard<()>,
}

impl AdmissionGuard {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }
}

/// Outcome of a checkout attempt on an existing visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOut {
    /// The visit was active and is now closed.
    Completed(Visit),
    /// The visit was already closed; nothing changed.
    AlreadyCheckedOut(Visit),
}

/// Shared handle to room and visit state.
pub struct Store {
    rooms: DashMap<RoomId, Room>,
    visits: DashMap<VisitId, Visit>,
    admission_locks: DashMap<RoomId, Arc<Mutex<()>>>,
    /// Serializes mutations and snapshot writes.
    persist_lock: Mutex<()>,
    next_seq: AtomicU64,
    snapshot_path: Option<PathBuf>,
    write_through: bool,
}

impl Store {
    /// A store without a backing file.
    pub fn in_memory() -> Self {
        Self::from_snapshot(Snapshot::default(), None, false)
    }

    /// Open the store described by `config`, loading its snapshot when present.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        let Some(path) = config.snapshot_path.as_ref().map(PathBuf::from) else {
            return Ok(Self::in_memory());
        };
        let snapshot = Snapshot::load(&path)?;
        tracing::info!(
            path = %path.display(),
            rooms = snapshot.rooms.len(),
            visits = snapshot.visits.len(),
            "Loaded store snapshot"
        );
        Ok(Self::from_snapshot(snapshot, Some(path), config.write_through))
    }

    fn from_snapshot(snapshot: Snapshot, snapshot_path: Option<PathBuf>, write_through: bool) -> Self {
        let next_seq = snapshot.visits.iter().map(|v| v.seq + 1).max().unwrap_or(0);
        let rooms = snapshot.rooms.into_iter().map(|r| (r.id, r)).collect();
        let visits = snapshot.visits.into_iter().map(|v| (v.id, v)).collect();
        Self {
            rooms,
            visits,
            admission_locks: DashMap::new(),
            persist_lock: Mutex::new(()),
            next_seq: AtomicU64::new(next_seq),
            snapshot_path,
            write_through,
        }
    }

    // ---- rooms ----

    pub fn room(&self, id: &RoomId) -> Option<Room> {
        self.rooms.get(id).map(|r| r.value().clone())
    }

    pub fn room_by_name(&self, name: &str) -> Option<Room> {
        self.rooms
            .iter()
            .find(|r| r.value().name == name)
            .map(|r| r.value().clone())
    }

    /// All rooms ordered by name.
    pub fn rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self.rooms.iter().map(|r| r.value().clone()).collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        rooms
    }

    /// Register a room. Names are unique.
    pub async fn insert_room(&self, name: String, capacity: u32) -> OccupancyResult<Room> {
        let _persist = self.persist_lock.lock().await;

        if self.room_by_name(&name).is_some() {
            return Err(OccupancyError::Conflict(format!("Room '{name}' already exists")));
        }

        let room = Room {
            id: Uuid::new_v4(),
            name,
            capacity,
        };
        self.write_staged(|snapshot| {
            snapshot.rooms.push(room.clone());
            snapshot.rooms.sort_by(|a, b| a.name.cmp(&b.name));
        })
        .await?;

        self.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    /// Change a room's capacity while holding its admission lock.
    pub async fn set_room_capacity(&self, guard: &AdmissionGuard, capacity: u32) -> OccupancyResult<Room> {
        let room_id = guard.room_id();
        let _persist = self.persist_lock.lock().await;

        let mut updated = self
            .room(&room_id)
            .ok_or_else(|| OccupancyError::RoomNotFound(room_id.to_string()))?;
        updated.capacity = capacity;
        self.write_staged(|snapshot| {
            if let Some(room) = snapshot.rooms.iter_mut().find(|r| r.id == room_id) {
                room.capacity = capacity;
            }
        })
        .await?;

        if let Some(mut room) = self.rooms.get_mut(&room_id) {
            room.capacity = capacity;
        }
        Ok(updated)
    }

    /// Acquire the admission lock for a room.
    pub async fn lock_room(&self, room_id: RoomId) -> AdmissionGuard {
        let lock = Arc::clone(self.admission_locks.entry(room_id).or_default().value());
        AdmissionGuard {
            room_id,
            _guard: lock.lock_owned().await,
        }
    }

    // ---- visits ----

    /// Number of active visits in a room.
    pub fn count_active(&self, room_id: &RoomId) -> usize {
        self.visits
            .iter()
            .filter(|v| v.value().room_id == *room_id && v.value().is_active())
            .count()
    }

    /// Active visit counts keyed by room. Rooms without visitors are absent.
    pub fn active_counts(&self) -> HashMap<RoomId, usize> {
        let mut counts = HashMap::new();
        for visit in self.visits.iter().filter(|v| v.value().is_active()) {
            *counts.entry(visit.value().room_id).or_insert(0) += 1;
        }
        counts
    }

    /// Append a visit to the ledger, stamping its insertion sequence.
    pub async fn insert_visit(&self, guard: &AdmissionGuard, mut visit: Visit) -> Result<Visit, StorageError> {
        debug_assert_eq!(guard.room_id(), visit.room_id);
        let _persist = self.persist_lock.lock().await;

        visit.seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.write_staged(|snapshot| snapshot.visits.push(visit.clone()))
            .await?;

        self.visits.insert(visit.id, visit.clone());
        Ok(visit)
    }

    pub fn visit(&self, id: &VisitId) -> Option<Visit> {
        self.visits.get(id).map(|v| v.value().clone())
    }

    /// Point-in-time copy of every visit.
    pub fn visits(&self) -> Vec<Visit> {
        self.visits.iter().map(|v| v.value().clone()).collect()
    }

    /// Close a visit in the guarded room. The checkout time never precedes
    /// the check-in time.
    pub async fn check_out(
        &self,
        guard: &AdmissionGuard,
        id: &VisitId,
        at: DateTime<Utc>,
    ) -> OccupancyResult<CheckOut> {
        let _persist = self.persist_lock.lock().await;

        let mut closed = self
            .visit(id)
            .ok_or_else(|| OccupancyError::VisitNotFound(id.to_string()))?;
        debug_assert_eq!(guard.room_id(), closed.room_id);
        if !closed.is_active() {
            return Ok(CheckOut::AlreadyCheckedOut(closed));
        }
        let check_out_at = at.max(closed.check_in_at);
        closed.check_out_at = Some(check_out_at);

        self.write_staged(|snapshot| {
            if let Some(visit) = snapshot.visits.iter_mut().find(|v| v.id == *id) {
                visit.check_out_at = Some(check_out_at);
            }
        })
        .await?;

        if let Some(mut visit) = self.visits.get_mut(id) {
            visit.check_out_at = Some(check_out_at);
        }
        Ok(CheckOut::Completed(closed))
    }

    // ---- persistence ----

    pub fn snapshot(&self) -> Snapshot {
        let mut visits = self.visits();
        visits.sort_by_key(|v| v.seq);
        Snapshot {
            rooms: self.rooms(),
            visits,
        }
    }

    /// Write the snapshot file, if one is configured.
    pub async fn save(&self) -> Result<(), StorageError> {
        let Some(path) = self.snapshot_path.clone() else {
            return Ok(());
        };
        let _persist = self.persist_lock.lock().await;
        write_snapshot(self.snapshot(), path).await
    }

    /// Save the current state with `stage` applied, when write-through is on.
    /// Callers hold the persist lock.
    async fn write_staged(&self, stage: impl FnOnce(&mut Snapshot)) -> Result<(), StorageError> {
        let Some(path) = self.snapshot_path.clone().filter(|_| self.write_through) else {
            return Ok(());
        };
        let mut snapshot = self.snapshot();
        stage(&mut snapshot);
        write_snapshot(snapshot, path).await
    }
}

async fn write_snapshot(snapshot: Snapshot, path: PathBuf) -> Result<(), StorageError> {
    tokio::task::spawn_blocking(move || {
        snapshot.save(&path)?;
        tracing::debug!(path = %path.display(), "Saved store snapshot");
        Ok::<_, StorageError>(())
    })
    .await
    .map_err(|e| StorageError::Io(std::io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NationalId;
    use chrono::Duration;
    use std::path::Path;

    fn visit_in(room_id: RoomId, name: &str) -> Visit {
        Visit {
            id: Uuid::new_v4(),
            name: name.into(),
            cpf: NationalId::parse("12345678900").unwrap(),
            email: None,
            birth_date: None,
            room_id,
            check_in_at: Utc::now(),
            check_out_at: None,
            created_by: None,
            seq: 0,
        }
    }

    fn write_through_at(path: &Path) -> StorageConfig {
        StorageConfig {
            snapshot_path: Some(path.display().to_string()),
            write_through: true,
        }
    }

    async fn admit(store: &Store, room_id: RoomId, name: &str) -> Visit {
        let guard = store.lock_room(room_id).await;
        store.insert_visit(&guard, visit_in(room_id, name)).await.unwrap()
    }

    #[tokio::test]
    async fn test_room_names_unique() {
        let store = Store::in_memory();
        store.insert_room("Lab".into(), 2).await.unwrap();
        let err = store.insert_room("Lab".into(), 5).await.unwrap_err();
        assert!(matches!(err, OccupancyError::Conflict(_)));
        assert_eq!(store.rooms().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_seq() {
        let store = Store::in_memory();
        let room = store.insert_room("Lab".into(), 5).await.unwrap();
        let guard = store.lock_room(room.id).await;

        let a = store.insert_visit(&guard, visit_in(room.id, "A")).await.unwrap();
        let b = store.insert_visit(&guard, visit_in(room.id, "B")).await.unwrap();
        assert!(b.seq > a.seq);
        assert_eq!(store.count_active(&room.id), 2);
    }

    #[tokio::test]
    async fn test_check_out_is_idempotent() {
        let store = Store::in_memory();
        let room = store.insert_room("Lab".into(), 1).await.unwrap();
        let visit = admit(&store, room.id, "A").await;

        let guard = store.lock_room(room.id).await;
        let first = match store.check_out(&guard, &visit.id, Utc::now()).await.unwrap() {
            CheckOut::Completed(v) => v,
            other => panic!("unexpected {other:?}"),
        };
        let again = store
            .check_out(&guard, &visit.id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(again, CheckOut::AlreadyCheckedOut(first.clone()));
        assert_eq!(store.visit(&visit.id).unwrap().check_out_at, first.check_out_at);
        assert_eq!(store.count_active(&room.id), 0);
    }

    #[tokio::test]
    async fn test_check_out_never_precedes_check_in() {
        let store = Store::in_memory();
        let room = store.insert_room("Lab".into(), 1).await.unwrap();
        let visit = admit(&store, room.id, "A").await;

        let guard = store.lock_room(room.id).await;
        let early = visit.check_in_at - Duration::minutes(5);
        match store.check_out(&guard, &visit.id, early).await.unwrap() {
            CheckOut::Completed(v) => assert_eq!(v.check_out_at, Some(v.check_in_at)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_visit_not_found() {
        let store = Store::in_memory();
        let guard = store.lock_room(Uuid::new_v4()).await;
        let err = store
            .check_out(&guard, &Uuid::new_v4(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, OccupancyError::VisitNotFound(_)));
    }

    #[tokio::test]
    async fn test_write_through_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_through_at(&dir.path().join("state.json"));

        let store = Store::open(&config).unwrap();
        let room = store.insert_room("Lab".into(), 3).await.unwrap();
        let visit = admit(&store, room.id, "A").await;

        let reopened = Store::open(&config).unwrap();
        assert_eq!(reopened.room(&room.id), Some(room.clone()));
        assert_eq!(reopened.visit(&visit.id), Some(visit.clone()));

        let next = admit(&reopened, room.id, "B").await;
        assert!(next.seq > visit.seq);
    }

    #[tokio::test]
    async fn test_failed_room_write_leaves_registry_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_through_at(&dir.path().join("missing").join("state.json"));
        let store = Store::open(&config).unwrap();

        let err = store.insert_room("Lab".into(), 1).await.unwrap_err();
        assert!(matches!(err, OccupancyError::Storage(_)));
        assert!(store.rooms().is_empty());
    }

    #[tokio::test]
    async fn test_failed_visit_write_leaves_slot_free() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let store = Store::open(&write_through_at(&sub.join("state.json"))).unwrap();
        let room = store.insert_room("Lab".into(), 1).await.unwrap();
        std::fs::remove_dir_all(&sub).unwrap();

        let guard = store.lock_room(room.id).await;
        let visit = visit_in(room.id, "A");
        let err = store.insert_visit(&guard, visit.clone()).await.unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(store.count_active(&room.id), 0);
        assert!(store.visit(&visit.id).is_none());
        assert!(store.visits().is_empty());
    }

    #[tokio::test]
    async fn test_failed_check_out_write_keeps_visit_active() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let store = Store::open(&write_through_at(&sub.join("state.json"))).unwrap();
        let room = store.insert_room("Lab".into(), 1).await.unwrap();
        let visit = admit(&store, room.id, "A").await;
        std::fs::remove_dir_all(&sub).unwrap();

        let guard = store.lock_room(room.id).await;
        let err = store
            .check_out(&guard, &visit.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, OccupancyError::Storage(_)));
        assert!(store.visit(&visit.id).unwrap().is_active());
        assert_eq!(store.count_active(&room.id), 1);
    }

    #[tokio::test]
    async fn test_failed_capacity_write_keeps_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let store = Store::open(&write_through_at(&sub.join("state.json"))).unwrap();
        let room = store.insert_room("Lab".into(), 1).await.unwrap();
        std::fs::remove_dir_all(&sub).unwrap();

        let guard = store.lock_room(room.id).await;
        let err = store.set_room_capacity(&guard, 9).await.unwrap_err();
        assert!(matches!(err, OccupancyError::Storage(_)));
        assert_eq!(store.room(&room.id).unwrap().capacity, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_write_through_keeps_every_visit() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_through_at(&dir.path().join("state.json"));
        let store = Arc::new(Store::open(&config).unwrap());
        let lab = store.insert_room("Lab".into(), 50).await.unwrap();
        let hall = store.insert_room("Hall".into(), 50).await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let store = Arc::clone(&store);
                let room_id = if i % 2 == 0 { lab.id } else { hall.id };
                tokio::spawn(async move { admit(&store, room_id, &format!("V{i}")).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let reopened = Store::open(&config).unwrap();
        assert_eq!(reopened.visits().len(), 20);
        assert_eq!(reopened.count_active(&lab.id), 10);
        assert_eq!(reopened.count_active(&hall.id), 10);
    }
}
