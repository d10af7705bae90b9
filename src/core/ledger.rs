use chrono::NaiveDateTime;
use tracing::warn;

use crate::core::error::CoreError;
use crate::model::ledger::EventKind;
use crate::store::ActivityStore;
use crate::utils::duration::hms_between;

/// Derives the per-employee-per-day login/logout summary from the raw
/// event log. The raw log is append-only and is the source of truth; the
/// ledger row is just the materialized view of it.
pub struct LoginLedger<S> {
    store: S,
}

impl<S: ActivityStore> LoginLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends the raw login event and lazily creates today's ledger row
    /// from the earliest login seen today. First login wins: repeated
    /// logins never move the recorded first-login time.
    pub async fn record_login(&self, emp_id: &str, now: NaiveDateTime) -> Result<(), CoreError> {
        let day = now.date();
        self.store
            .append_raw_event(emp_id, EventKind::Login, "User logged in", now)
            .await?;

        if self.store.find_login_ledger(emp_id, day).await?.is_none() {
            if let Some(first) = self.store.earliest_event(emp_id, EventKind::Login, day).await? {
                self.store
                    .insert_login_ledger(emp_id, day, first.time())
                    .await?;
            }
        }
        Ok(())
    }

    /// Appends the raw logout event and extends the ledger row to the
    /// latest logout seen today. Last logout wins: each logout/login cycle
    /// stretches the recorded window. A logout with no recorded login
    /// today is a logged no-op.
    pub async fn record_logout(&self, emp_id: &str, now: NaiveDateTime) -> Result<(), CoreError> {
        let day = now.date();
        self.store
            .append_raw_event(emp_id, EventKind::Logout, "User logged out", now)
            .await?;

        let Some(entry) = self.store.find_login_ledger(emp_id, day).await? else {
            warn!(emp_id, "Logout without a recorded login today");
            return Ok(());
        };

        let last = self
            .store
            .latest_event(emp_id, EventKind::Logout, day)
            .await?
            .unwrap_or(now);
        let duration = hms_between(day.and_time(entry.login_time), last);
        self.store
            .update_login_ledger(emp_id, day, last.time(), &duration)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[actix_web::test]
    async fn first_login_creates_the_ledger_entry() {
        let ledger = LoginLedger::new(MemoryStore::new());
        ledger.record_login("E2", at(8, 55, 0)).await.unwrap();

        let entries = ledger.store.ledger_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].login_time, t(8, 55, 0));
        assert!(entries[0].logout_time.is_none());
        assert!(entries[0].duration.is_none());
    }

    #[actix_web::test]
    async fn duplicate_login_keeps_the_first_login_time() {
        let ledger = LoginLedger::new(MemoryStore::new());
        ledger.record_login("E2", at(8, 55, 0)).await.unwrap();
        ledger.record_login("E2", at(9, 10, 0)).await.unwrap();

        let entries = ledger.store.ledger_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].login_time, t(8, 55, 0));
    }

    #[actix_web::test]
    async fn logout_fills_logout_time_and_duration() {
        let ledger = LoginLedger::new(MemoryStore::new());
        ledger.record_login("E2", at(8, 55, 0)).await.unwrap();
        ledger.record_login("E2", at(9, 10, 0)).await.unwrap();
        ledger.record_logout("E2", at(17, 2, 10)).await.unwrap();

        let entries = ledger.store.ledger_entries();
        assert_eq!(entries[0].login_time, t(8, 55, 0));
        assert_eq!(entries[0].logout_time, Some(t(17, 2, 10)));
        assert_eq!(entries[0].duration.as_deref(), Some("08:07:10"));
    }

    #[actix_web::test]
    async fn later_logout_extends_the_recorded_window() {
        let ledger = LoginLedger::new(MemoryStore::new());
        ledger.record_login("E2", at(8, 55, 0)).await.unwrap();
        ledger.record_logout("E2", at(17, 0, 0)).await.unwrap();
        ledger.record_login("E2", at(17, 15, 0)).await.unwrap();
        ledger.record_logout("E2", at(17, 30, 0)).await.unwrap();

        let entries = ledger.store.ledger_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].logout_time, Some(t(17, 30, 0)));
        assert_eq!(entries[0].duration.as_deref(), Some("08:35:00"));
    }

    #[actix_web::test]
    async fn logout_without_login_is_a_silent_noop() {
        let ledger = LoginLedger::new(MemoryStore::new());
        ledger.record_logout("E2", at(17, 0, 0)).await.unwrap();

        assert!(ledger.store.ledger_entries().is_empty());
    }
}
