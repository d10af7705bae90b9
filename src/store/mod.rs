#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use derive_more::{Display, Error};

use crate::model::activity::{ActivityReportRow, Category, LiveActivityRow, OpenActivity};
use crate::model::ledger::{EventKind, LoginLedgerEntry, LoginReportRow};

#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(#[error(source)] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence Gateway contract. All durable state lives behind this trait;
/// the core keeps nothing across requests, so a restarted process recovers
/// every open activity from the store.
#[allow(async_fn_in_trait)]
pub trait ActivityStore: Send + Sync {
    /// Inserts a new activity row with a null stop timestamp.
    async fn insert_open_activity(
        &self,
        emp_id: &str,
        category: Category,
        label: &str,
        start: NaiveDateTime,
    ) -> StoreResult<()>;

    /// Closes the record matching the full composite key, provided it is
    /// still open. Returns the number of rows matched so callers can
    /// observe a record that vanished underneath them.
    async fn close_activity(
        &self,
        emp_id: &str,
        category: Category,
        label: &str,
        start: NaiveDateTime,
        stop: NaiveDateTime,
        duration: &str,
    ) -> StoreResult<u64>;

    /// Closes every open record in every category, computing each record's
    /// duration from its own start time. Each category commits
    /// independently; a failed table does not roll back the others.
    async fn close_all_open(&self, emp_id: &str, now: NaiveDateTime) -> StoreResult<u64>;

    /// Open rows across all three categories for the given day.
    async fn find_open_activities(
        &self,
        emp_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Vec<OpenActivity>>;

    async fn append_raw_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        description: &str,
        at: NaiveDateTime,
    ) -> StoreResult<()>;

    async fn earliest_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        day: NaiveDate,
    ) -> StoreResult<Option<NaiveDateTime>>;

    async fn latest_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        day: NaiveDate,
    ) -> StoreResult<Option<NaiveDateTime>>;

    async fn find_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<LoginLedgerEntry>>;

    async fn insert_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
        login_time: NaiveTime,
    ) -> StoreResult<()>;

    async fn update_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
        logout_time: NaiveTime,
        duration: &str,
    ) -> StoreResult<u64>;

    /// Task labels configured for a process; `task` activity labels are
    /// validated against this list.
    async fn tasks_for_process(&self, process: &str) -> StoreResult<Vec<String>>;

    // Read-only report feeds; external to the lifecycle core.

    async fn list_activities_for_processes(
        &self,
        processes: &[String],
        category: Option<Category>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> StoreResult<Vec<ActivityReportRow>>;

    async fn list_open_for_processes(
        &self,
        processes: &[String],
        day: NaiveDate,
    ) -> StoreResult<Vec<LiveActivityRow>>;

    async fn list_login_ledger(
        &self,
        processes: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LoginReportRow>>;
}
