//! In-memory `ActivityStore` used by the core unit tests. Mirrors the MySQL
//! gateway's observable behavior, including composite-key matching and
//! per-record durations on force-stop.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{ActivityStore, StoreResult};
use crate::model::activity::{ActivityReportRow, Category, LiveActivityRow, OpenActivity};
use crate::model::ledger::{EventKind, LoginLedgerEntry, LoginReportRow};
use crate::utils::duration::hms_between;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredActivity {
    pub id: u64,
    pub emp_id: String,
    pub category: Category,
    pub label: String,
    pub start_time: NaiveDateTime,
    pub stop_time: Option<NaiveDateTime>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredEvent {
    emp_id: String,
    kind: EventKind,
    timestamp: NaiveDateTime,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    activities: Vec<StoredActivity>,
    events: Vec<StoredEvent>,
    ledger: Vec<LoginLedgerEntry>,
    users: Vec<(String, String, String)>, // emp_id, name, process
    process_tasks: HashMap<String, Vec<String>>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, emp_id: &str, name: &str, process: &str) -> Self {
        self.inner.lock().unwrap().users.push((
            emp_id.to_string(),
            name.to_string(),
            process.to_string(),
        ));
        self
    }

    pub fn with_task(self, process: &str, label: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .process_tasks
            .entry(process.to_string())
            .or_default()
            .push(label.to_string());
        self
    }

    pub fn activities(&self) -> Vec<StoredActivity> {
        self.inner.lock().unwrap().activities.clone()
    }

    pub fn ledger_entries(&self) -> Vec<LoginLedgerEntry> {
        self.inner.lock().unwrap().ledger.clone()
    }
}

impl ActivityStore for MemoryStore {
    async fn insert_open_activity(
        &self,
        emp_id: &str,
        category: Category,
        label: &str,
        start: NaiveDateTime,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.activities.push(StoredActivity {
            id,
            emp_id: emp_id.to_string(),
            category,
            label: label.to_string(),
            start_time: start,
            stop_time: None,
            duration: None,
        });
        Ok(())
    }

    async fn close_activity(
        &self,
        emp_id: &str,
        category: Category,
        label: &str,
        start: NaiveDateTime,
        stop: NaiveDateTime,
        duration: &str,
    ) -> StoreResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut matched = 0;
        for record in inner.activities.iter_mut().filter(|r| {
            r.emp_id == emp_id
                && r.category == category
                && r.label == label
                && r.start_time == start
                && r.stop_time.is_none()
        }) {
            record.stop_time = Some(stop);
            record.duration = Some(duration.to_string());
            matched += 1;
        }
        Ok(matched)
    }

    async fn close_all_open(&self, emp_id: &str, now: NaiveDateTime) -> StoreResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut closed = 0;
        for record in inner
            .activities
            .iter_mut()
            .filter(|r| r.emp_id == emp_id && r.stop_time.is_none())
        {
            record.stop_time = Some(now);
            record.duration = Some(hms_between(record.start_time, now));
            closed += 1;
        }
        Ok(closed)
    }

    async fn find_open_activities(
        &self,
        emp_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Vec<OpenActivity>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .activities
            .iter()
            .filter(|r| {
                r.emp_id == emp_id && r.stop_time.is_none() && r.start_time.date() == day
            })
            .map(|r| OpenActivity {
                id: r.id,
                category: r.category,
                label: r.label.clone(),
                start_time: r.start_time,
            })
            .collect())
    }

    async fn append_raw_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        _description: &str,
        at: NaiveDateTime,
    ) -> StoreResult<()> {
        self.inner.lock().unwrap().events.push(StoredEvent {
            emp_id: emp_id.to_string(),
            kind,
            timestamp: at,
        });
        Ok(())
    }

    async fn earliest_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        day: NaiveDate,
    ) -> StoreResult<Option<NaiveDateTime>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .events
            .iter()
            .filter(|e| e.emp_id == emp_id && e.kind == kind && e.timestamp.date() == day)
            .map(|e| e.timestamp)
            .min())
    }

    async fn latest_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        day: NaiveDate,
    ) -> StoreResult<Option<NaiveDateTime>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .events
            .iter()
            .filter(|e| e.emp_id == emp_id && e.kind == kind && e.timestamp.date() == day)
            .map(|e| e.timestamp)
            .max())
    }

    async fn find_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<LoginLedgerEntry>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .ledger
            .iter()
            .find(|e| e.emp_id == emp_id && e.log_date == day)
            .cloned())
    }

    async fn insert_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
        login_time: NaiveTime,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.ledger.push(LoginLedgerEntry {
            id,
            emp_id: emp_id.to_string(),
            log_date: day,
            login_time,
            logout_time: None,
            duration: None,
        });
        Ok(())
    }

    async fn update_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
        logout_time: NaiveTime,
        duration: &str,
    ) -> StoreResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut matched = 0;
        for entry in inner
            .ledger
            .iter_mut()
            .filter(|e| e.emp_id == emp_id && e.log_date == day)
        {
            entry.logout_time = Some(logout_time);
            entry.duration = Some(duration.to_string());
            matched += 1;
        }
        Ok(matched)
    }

    async fn tasks_for_process(&self, process: &str) -> StoreResult<Vec<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.process_tasks.get(process).cloned().unwrap_or_default())
    }

    async fn list_activities_for_processes(
        &self,
        processes: &[String],
        category: Option<Category>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> StoreResult<Vec<ActivityReportRow>> {
        let inner = self.inner.lock().unwrap();
        let names: HashMap<&str, &str> = inner
            .users
            .iter()
            .filter(|(_, _, p)| processes.contains(p))
            .map(|(e, n, _)| (e.as_str(), n.as_str()))
            .collect();

        let mut rows: Vec<ActivityReportRow> = inner
            .activities
            .iter()
            .filter(|r| {
                names.contains_key(r.emp_id.as_str())
                    && category.is_none_or(|c| c == r.category)
                    && r.start_time >= from
                    && r.start_time < to
            })
            .map(|r| ActivityReportRow {
                name: names[r.emp_id.as_str()].to_string(),
                emp_id: r.emp_id.clone(),
                category: r.category,
                activity_name: r.label.clone(),
                start_time: r.start_time,
                stop_time: r.stop_time,
                total_duration: r.duration.clone(),
            })
            .collect();

        rows.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(rows)
    }

    async fn list_open_for_processes(
        &self,
        processes: &[String],
        day: NaiveDate,
    ) -> StoreResult<Vec<LiveActivityRow>> {
        let inner = self.inner.lock().unwrap();
        let names: HashMap<&str, &str> = inner
            .users
            .iter()
            .filter(|(_, _, p)| processes.contains(p))
            .map(|(e, n, _)| (e.as_str(), n.as_str()))
            .collect();

        Ok(inner
            .activities
            .iter()
            .filter(|r| {
                names.contains_key(r.emp_id.as_str())
                    && r.stop_time.is_none()
                    && r.start_time.date() == day
            })
            .map(|r| LiveActivityRow {
                name: names[r.emp_id.as_str()].to_string(),
                category: r.category,
                activity_name: r.label.clone(),
                start_time: r.start_time,
            })
            .collect())
    }

    async fn list_login_ledger(
        &self,
        processes: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LoginReportRow>> {
        let inner = self.inner.lock().unwrap();
        let names: HashMap<&str, &str> = inner
            .users
            .iter()
            .filter(|(_, _, p)| processes.contains(p))
            .map(|(e, n, _)| (e.as_str(), n.as_str()))
            .collect();

        Ok(inner
            .ledger
            .iter()
            .filter(|e| {
                names.contains_key(e.emp_id.as_str()) && e.log_date >= from && e.log_date < to
            })
            .map(|e| LoginReportRow {
                name: names[e.emp_id.as_str()].to_string(),
                emp_id: e.emp_id.clone(),
                log_date: e.log_date,
                login_time: e.login_time,
                logout_time: e.logout_time,
                duration: e.duration.clone(),
            })
            .collect())
    }
}
