//! Read-only views over the visit ledger and the audit log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::domain::{AuditEntry, AuditLevel, NationalId, RoomId, RoomOccupancy, Visit, VisitId};
use crate::query::filter::{ActiveVisitorsFilter, AuditFilter, HistoryFilter, Page};
use crate::storage::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveVisitor {
    pub id: VisitId,
    pub name: String,
    pub cpf: NationalId,
    pub room_id: RoomId,
    pub room_name: String,
    pub check_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: VisitId,
    pub name: String,
    pub cpf: NationalId,
    pub room_id: RoomId,
    pub room_name: String,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
}

/// Audit entry with commonly used metadata lifted to the top level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub level: AuditLevel,
    pub message: String,
    pub user_id: Option<Value>,
    pub visit_id: Option<Value>,
    pub room_id: Option<Value>,
    pub meta: Value,
}

impl From<AuditEntry> for LogRow {
    fn from(entry: AuditEntry) -> Self {
        let lift = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| entry.meta.get(*k))
                .find(|v| !v.is_null())
                .cloned()
        };
        Self {
            id: entry.id,
            created_at: entry.created_at,
            level: entry.level,
            user_id: lift(&["userId", "actorId"]),
            visit_id: lift(&["visitId"]),
            room_id: lift(&["roomId"]),
            message: entry.message,
            meta: entry.meta,
        }
    }
}

/// Serves filtered, paginated views.
#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<Store>,
    audit: AuditLog,
}

impl QueryEngine {
    pub fn new(store: Arc<Store>, audit: AuditLog) -> Self {
        Self { store, audit }
    }

    /// Visitors currently in a room, newest check-in first.
    pub fn active_visitors(&self, filter: &ActiveVisitorsFilter) -> Vec<ActiveVisitor> {
        let room_names = self.room_names();
        let mut visits: Vec<Visit> = self
            .store
            .visits()
            .into_iter()
            .filter(Visit::is_active)
            .filter(|v| filter.room_id.map_or(true, |room| v.room_id == room))
            .filter(|v| filter.search.matches(&v.name, v.cpf.as_str()))
            .collect();
        sort_newest_first(&mut visits);

        visits
            .into_iter()
            .map(|v| ActiveVisitor {
                room_name: room_name(&room_names, &v.room_id),
                id: v.id,
                name: v.name,
                cpf: v.cpf,
                room_id: v.room_id,
                check_in_at: v.check_in_at,
            })
            .collect()
    }

    /// Every visit, active or closed, matching the filter; newest check-in first.
    pub fn history(&self, filter: &HistoryFilter) -> Page<HistoryItem> {
        let room_names = self.room_names();
        let mut visits: Vec<Visit> = self
            .store
            .visits()
            .into_iter()
            .filter(|v| filter.room_id.map_or(true, |room| v.room_id == room))
            .filter(|v| filter.search.matches(&v.name, v.cpf.as_str()))
            .filter(|v| filter.range.contains(v.check_in_at))
            .collect();
        sort_newest_first(&mut visits);

        let items = visits
            .into_iter()
            .map(|v| HistoryItem {
                room_name: room_name(&room_names, &v.room_id),
                id: v.id,
                name: v.name,
                cpf: v.cpf,
                room_id: v.room_id,
                check_in_at: v.check_in_at,
                check_out_at: v.check_out_at,
            })
            .collect();
        filter.pagination.apply(items)
    }

    /// Audit entries matching the filter; newest first.
    pub fn audit_log(&self, filter: &AuditFilter) -> Page<LogRow> {
        let mut entries: Vec<AuditEntry> = self
            .audit
            .entries()
            .into_iter()
            .filter(|e| filter.level.map_or(true, |level| e.level == level))
            .filter(|e| filter.matches_message(&e.message))
            .filter(|e| filter.range.contains(e.created_at))
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));

        filter
            .pagination
            .apply(entries.into_iter().map(LogRow::from).collect())
    }

    /// Rooms ordered by name with their current occupancy.
    pub fn rooms_with_active_counts(&self) -> Vec<RoomOccupancy> {
        let counts = self.store.active_counts();
        self.store
            .rooms()
            .into_iter()
            .map(|room| RoomOccupancy {
                active_count: counts.get(&room.id).copied().unwrap_or(0),
                id: room.id,
                name: room.name,
                capacity: room.capacity,
            })
            .collect()
    }

    fn room_names(&self) -> HashMap<RoomId, String> {
        self.store.rooms().into_iter().map(|r| (r.id, r.name)).collect()
    }
}

/// Check-in descending; equal timestamps put the later insertion first.
fn sort_newest_first(visits: &mut [Visit]) {
    visits.sort_by(|a, b| b.check_in_at.cmp(&a.check_in_at).then(b.seq.cmp(&a.seq)));
}

fn room_name(names: &HashMap<RoomId, String>, id: &RoomId) -> String {
    names.get(id).cloned().unwrap_or_default()
}
