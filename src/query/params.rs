//! Raw query-string parameters and their validation into typed filters.

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{AuditLevel, OccupancyError, OccupancyResult, RoomId};
use crate::query::filter::{
    non_empty, ActiveVisitorsFilter, AuditFilter, DateRange, HistoryFilter, Pagination, SearchFilter,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveVisitorsParams {
    pub room_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub room_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditParams {
    pub level: Option<String>,
    pub search: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ActiveVisitorsParams {
    pub fn into_filter(self) -> OccupancyResult<ActiveVisitorsFilter> {
        Ok(ActiveVisitorsFilter {
            room_id: parse_room_id(self.room_id.as_deref())?,
            search: SearchFilter::parse(self.search.as_deref()),
        })
    }
}

impl HistoryParams {
    pub fn into_filter(self) -> OccupancyResult<HistoryFilter> {
        Ok(HistoryFilter {
            room_id: parse_room_id(self.room_id.as_deref())?,
            search: SearchFilter::parse(self.search.as_deref()),
            range: DateRange::parse(self.from.as_deref(), self.to.as_deref())?,
            pagination: Pagination::parse(self.page.as_deref(), self.page_size.as_deref())?,
        })
    }
}

impl AuditParams {
    pub fn into_filter(self) -> OccupancyResult<AuditFilter> {
        Ok(AuditFilter {
            level: non_empty(self.level.as_deref())
                .map(str::parse::<AuditLevel>)
                .transpose()?,
            search: AuditFilter::parse_search(self.search.as_deref()),
            range: DateRange::parse(self.from.as_deref(), self.to.as_deref())?,
            pagination: Pagination::parse(self.page.as_deref(), self.page_size.as_deref())?,
        })
    }
}

fn parse_room_id(raw: Option<&str>) -> OccupancyResult<Option<RoomId>> {
    non_empty(raw)
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| OccupancyError::validation(format!("Invalid roomId '{raw}'")))
        })
        .transpose()
}
