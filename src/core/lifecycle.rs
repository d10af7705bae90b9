use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::core::error::CoreError;
use crate::model::activity::Category;
use crate::notify::{ActivityEvent, Notifier};
use crate::store::ActivityStore;
use crate::utils::duration::hms_between;

/// Lazily grown registry of per-employee mutexes. Start, stop and
/// force-stop for the same employee serialize on one lock; different
/// employees never contend.
#[derive(Default)]
struct EmployeeLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl EmployeeLocks {
    fn for_employee(&self, emp_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(emp_id.to_string()).or_default().clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    Closed { label: String, duration: String },
    /// Stop arrived with no open record in the category. Logged, not an
    /// error; the likely cause is a force-stop that already ran.
    NothingOpen,
}

/// Enforces the one-open-record-per-category invariant and performs the
/// start / stop / force-stop transitions. Holds no activity state itself;
/// everything durable lives in the store.
pub struct LifecycleManager<S> {
    store: S,
    notifier: Arc<dyn Notifier>,
    locks: EmployeeLocks,
}

impl<S: ActivityStore> LifecycleManager<S> {
    pub fn new(store: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            locks: EmployeeLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Opens a new activity record at `now`. Task labels are validated
    /// against the configured task lists of the caller's processes. Any
    /// record still open in the same category is closed first, so a second
    /// start can never create a duplicate open row.
    pub async fn start(
        &self,
        emp_id: &str,
        processes: &[String],
        category: Category,
        label: &str,
        now: NaiveDateTime,
    ) -> Result<(), CoreError> {
        let lock = self.locks.for_employee(emp_id);
        let _guard = lock.lock().await;

        if category == Category::Task {
            self.validate_task_label(processes, label).await?;
        }

        let open = self.store.find_open_activities(emp_id, now.date()).await?;
        for record in open.into_iter().filter(|r| r.category == category) {
            warn!(
                emp_id,
                %category,
                label = %record.label,
                "Record left open at start; auto-closing"
            );
            let duration = hms_between(record.start_time, now);
            self.store
                .close_activity(emp_id, category, &record.label, record.start_time, now, &duration)
                .await?;
        }

        self.store
            .insert_open_activity(emp_id, category, label, now)
            .await?;
        info!(emp_id, %category, label, "Activity started");

        // Fire-and-forget; a dropped notification never fails the mutation.
        self.notifier
            .emit(ActivityEvent::new_activity(emp_id, category, label));

        Ok(())
    }

    /// Closes the open record for (employee, category), resolved here
    /// rather than from any caller-supplied key. Duration is the wall-clock
    /// span truncated to whole seconds.
    pub async fn stop(
        &self,
        emp_id: &str,
        category: Category,
        now: NaiveDateTime,
    ) -> Result<StopOutcome, CoreError> {
        let lock = self.locks.for_employee(emp_id);
        let _guard = lock.lock().await;

        let mut open: Vec<_> = self
            .store
            .find_open_activities(emp_id, now.date())
            .await?
            .into_iter()
            .filter(|r| r.category == category)
            .collect();
        open.sort_by_key(|r| r.start_time);

        let Some(record) = open.into_iter().next() else {
            warn!(emp_id, %category, "Stop requested with nothing open");
            return Ok(StopOutcome::NothingOpen);
        };

        let duration = hms_between(record.start_time, now);
        let matched = self
            .store
            .close_activity(emp_id, category, &record.label, record.start_time, now, &duration)
            .await?;
        if matched == 0 {
            warn!(emp_id, %category, label = %record.label, "Open record vanished before close");
            return Err(CoreError::NoMatchingRecord { category });
        }

        info!(emp_id, %category, label = %record.label, %duration, "Activity stopped");
        Ok(StopOutcome::Closed {
            label: record.label,
            duration,
        })
    }

    /// Recovery sweep for logout and tab-close signals: closes every open
    /// record in every category, each with a duration from its own start
    /// time. Idempotent; running it with nothing open is a no-op.
    pub async fn force_stop_all_open(
        &self,
        emp_id: &str,
        now: NaiveDateTime,
    ) -> Result<u64, CoreError> {
        let lock = self.locks.for_employee(emp_id);
        let _guard = lock.lock().await;

        let closed = self.store.close_all_open(emp_id, now).await?;
        if closed > 0 {
            info!(emp_id, closed, "Force-stopped open activities");
        }
        Ok(closed)
    }

    async fn validate_task_label(
        &self,
        processes: &[String],
        label: &str,
    ) -> Result<(), CoreError> {
        for process in processes {
            let tasks = self.store.tasks_for_process(process).await?;
            if tasks.iter().any(|t| t == label) {
                return Ok(());
            }
        }
        Err(CoreError::UnknownTaskLabel {
            label: label.to_string(),
        })
    }
}
