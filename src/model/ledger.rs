use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Raw login/logout event kinds, appended to the event log and never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    Login,
    Logout,
}

/// Per-employee-per-day summary: first login of the day, last logout so
/// far, and the elapsed span between them. At most one entry per employee
/// per day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LoginLedgerEntry {
    pub id: u64,
    pub emp_id: String,
    pub log_date: NaiveDate,
    pub login_time: NaiveTime,
    pub logout_time: Option<NaiveTime>,
    pub duration: Option<String>,
}

/// Ledger row joined with the credential display name, for manager reports.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct LoginReportRow {
    pub name: String,
    pub emp_id: String,
    pub log_date: NaiveDate,
    pub login_time: NaiveTime,
    pub logout_time: Option<NaiveTime>,
    pub duration: Option<String>,
}
