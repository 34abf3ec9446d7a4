//! Typed query filters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;

use crate::domain::national_id::digits_only;
use crate::domain::{AuditLevel, OccupancyError, OccupancyResult, RoomId};

/// Free-text visitor search.
///
/// Matches on name (case-insensitive, at least two characters) or on the
/// national identifier (at least three digits). A term that qualifies for
/// neither applies no filter at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    name: Option<String>,
    digits: Option<String>,
}

impl SearchFilter {
    pub const MIN_NAME_CHARS: usize = 2;
    pub const MIN_DIGITS: usize = 3;

    pub fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::default();
        };
        let name = (text.chars().count() >= Self::MIN_NAME_CHARS).then(|| text.to_lowercase());
        let digits = Some(digits_only(text)).filter(|d| d.len() >= Self::MIN_DIGITS);
        Self { name, digits }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.name.is_none() && self.digits.is_none()
    }

    pub fn matches(&self, name: &str, cpf: &str) -> bool {
        if self.is_unfiltered() {
            return true;
        }
        let by_name = self
            .name
            .as_deref()
            .is_some_and(|needle| name.to_lowercase().contains(needle));
        let by_cpf = self.digits.as_deref().is_some_and(|needle| cpf.contains(needle));
        by_name || by_cpf
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Inclusive timestamp range. Bare `YYYY-MM-DD` bounds cover whole days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> OccupancyResult<Self> {
        let from = non_empty(from).map(|raw| parse_bound(raw, "from", Bound::Start)).transpose()?;
        let to = non_empty(to).map(|raw| parse_bound(raw, "to", Bound::End)).transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(OccupancyError::validation("'from' must not be after 'to'"));
            }
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

fn parse_bound(raw: &str, field: &str, bound: Bound) -> OccupancyResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => NaiveTime::MIN,
            Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN),
        };
        return Ok(date.and_time(time).and_utc());
    }
    Err(OccupancyError::validation(format!(
        "Invalid '{field}' date '{raw}': expected YYYY-MM-DD or RFC 3339"
    )))
}

/// Page selection. Page numbers start at 1; page sizes are clamped to `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn parse(page: Option<&str>, page_size: Option<&str>) -> OccupancyResult<Self> {
        let page = match non_empty(page) {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(p) if p >= 1 => p,
                _ => {
                    return Err(OccupancyError::validation(format!(
                        "Invalid page '{raw}': expected an integer >= 1"
                    )));
                }
            },
        };
        let page_size = match non_empty(page_size) {
            None => Self::DEFAULT_PAGE_SIZE,
            Some(raw) => {
                let size = raw.parse::<i64>().map_err(|_| {
                    OccupancyError::validation(format!("Invalid pageSize '{raw}': expected an integer"))
                })?;
                size.clamp(1, i64::from(Self::MAX_PAGE_SIZE)) as u32
            }
        };
        Ok(Self { page, page_size })
    }

    /// Items skipped before this page. A literal page 0 reads as page 1.
    pub fn offset(&self) -> usize {
        (self.page as usize)
            .saturating_sub(1)
            .saturating_mul(self.page_size as usize)
    }

    /// Cut one page out of an already ordered result set.
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len();
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size as usize)
            .collect();
        Page {
            total,
            page: self.page,
            page_size: self.page_size,
            items,
        }
    }
}

/// A page of results plus the size of the whole match set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveVisitorsFilter {
    pub room_id: Option<RoomId>,
    pub search: SearchFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub room_id: Option<RoomId>,
    pub search: SearchFilter,
    pub range: DateRange,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub level: Option<AuditLevel>,
    /// Lowercased message substring.
    pub search: Option<String>,
    pub range: DateRange,
    pub pagination: Pagination,
}

impl AuditFilter {
    pub fn parse_search(raw: Option<&str>) -> Option<String> {
        non_empty(raw).map(str::to_lowercase)
    }

    pub fn matches_message(&self, message: &str) -> bool {
        self.search
            .as_deref()
            .map_or(true, |needle| message.to_lowercase().contains(needle))
    }
}

pub(crate) fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
