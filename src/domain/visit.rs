//! Visit types and visitor validation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{OccupancyError, OccupancyResult};
use super::national_id::NationalId;
use super::room::RoomId;

pub type VisitId = Uuid;

/// A visitor's stay in a room. Active while `check_out_at` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: VisitId,
    pub name: String,
    pub cpf: NationalId,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub room_id: RoomId,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    /// Ledger insertion order.
    #[serde(default)]
    pub seq: u64,
}

impl Visit {
    pub fn is_active(&self) -> bool {
        self.check_out_at.is_none()
    }
}

/// Visitor data as received from the caller.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorInput {
    pub name: String,
    pub cpf: String,
    pub email: Option<String>,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
}

/// Visitor data that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitor {
    pub name: String,
    pub cpf: NationalId,
    pub email: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

impl VisitorInput {
    /// Validate and normalize into a [`NewVisitor`].
    ///
    /// An unparseable birth date is dropped rather than rejected.
    pub fn validate(self) -> OccupancyResult<NewVisitor> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(OccupancyError::validation("Visitor name must not be empty"));
        }

        let cpf = NationalId::parse(&self.cpf)?;

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) if is_plausible_email(email) => Some(email.to_string()),
            Some(email) => {
                return Err(OccupancyError::validation(format!("Invalid email: {email}")));
            }
        };

        let birth_date = self.birth_date.as_deref().and_then(|raw| {
            let parsed = parse_birth_date(raw);
            if parsed.is_none() {
                tracing::debug!(birth_date = %raw, "Ignoring unparseable birth date");
            }
            parsed
        });

        Ok(NewVisitor {
            name: name.to_string(),
            cpf,
            email,
            birth_date,
        })
    }
}

fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
