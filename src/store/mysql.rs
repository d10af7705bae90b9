use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::{FromRow, MySqlPool};
use tracing::error;

use super::{ActivityStore, StoreResult};
use crate::model::activity::{ActivityReportRow, Category, LiveActivityRow, OpenActivity};
use crate::model::ledger::{EventKind, LoginLedgerEntry, LoginReportRow};

/// Production gateway over the MySQL schema in `migrations/`. Table names
/// for the three activity categories come from `Category::table()`, never
/// from request data.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    let end = (day + Days::new(1)).and_time(NaiveTime::MIN);
    (start, end)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[derive(FromRow)]
struct RawActivityRow {
    name: String,
    emp_id: String,
    activity_name: String,
    start_time: NaiveDateTime,
    stop_time: Option<NaiveDateTime>,
    total_duration: Option<String>,
}

impl RawActivityRow {
    fn into_report(self, category: Category) -> ActivityReportRow {
        ActivityReportRow {
            name: self.name,
            emp_id: self.emp_id,
            category,
            activity_name: self.activity_name,
            start_time: self.start_time,
            stop_time: self.stop_time,
            total_duration: self.total_duration,
        }
    }
}

impl ActivityStore for MySqlStore {
    async fn insert_open_activity(
        &self,
        emp_id: &str,
        category: Category,
        label: &str,
        start: NaiveDateTime,
    ) -> StoreResult<()> {
        let sql = format!(
            "INSERT INTO {} (emp_id, activity_name, start_time) VALUES (?, ?, ?)",
            category.table()
        );
        sqlx::query(&sql)
            .bind(emp_id)
            .bind(label)
            .bind(start)
            .execute(&self.pool)
            .await?;
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
        let sql = format!(
            "UPDATE {} SET stop_time = ?, total_duration = ? \
             WHERE emp_id = ? AND activity_name = ? AND start_time = ? AND stop_time IS NULL",
            category.table()
        );
        let result = sqlx::query(&sql)
            .bind(stop)
            .bind(duration)
            .bind(emp_id)
            .bind(label)
            .bind(start)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn close_all_open(&self, emp_id: &str, now: NaiveDateTime) -> StoreResult<u64> {
        let mut closed = 0u64;
        let mut first_err = None;

        // One UPDATE per category table; a failing table is logged and the
        // rest are still attempted. The whole operation is idempotent.
        for category in Category::ALL {
            let sql = format!(
                "UPDATE {} SET stop_time = ?, \
                 total_duration = SEC_TO_TIME(TIMESTAMPDIFF(SECOND, start_time, ?)) \
                 WHERE emp_id = ? AND stop_time IS NULL",
                category.table()
            );
            match sqlx::query(&sql)
                .bind(now)
                .bind(now)
                .bind(emp_id)
                .execute(&self.pool)
                .await
            {
                Ok(result) => closed += result.rows_affected(),
                Err(e) => {
                    error!(error = %e, %category, emp_id, "Force-stop update failed");
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
            }
        }

        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(closed),
        }
    }

    async fn find_open_activities(
        &self,
        emp_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Vec<OpenActivity>> {
        let (from, to) = day_bounds(day);
        let mut open = Vec::new();

        for category in Category::ALL {
            let sql = format!(
                "SELECT id, activity_name, start_time FROM {} \
                 WHERE emp_id = ? AND stop_time IS NULL AND start_time >= ? AND start_time < ?",
                category.table()
            );
            let rows = sqlx::query_as::<_, (u64, String, NaiveDateTime)>(&sql)
                .bind(emp_id)
                .bind(from)
                .bind(to)
                .fetch_all(&self.pool)
                .await?;
            open.extend(rows.into_iter().map(|(id, label, start_time)| OpenActivity {
                id,
                category,
                label,
                start_time,
            }));
        }

        Ok(open)
    }

    async fn append_raw_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        description: &str,
        at: NaiveDateTime,
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO event_log (emp_id, kind, description, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(emp_id)
        .bind(kind.to_string())
        .bind(description)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn earliest_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        day: NaiveDate,
    ) -> StoreResult<Option<NaiveDateTime>> {
        let (from, to) = day_bounds(day);
        let ts: Option<NaiveDateTime> = sqlx::query_scalar(
            "SELECT MIN(timestamp) FROM event_log \
             WHERE emp_id = ? AND kind = ? AND timestamp >= ? AND timestamp < ?",
        )
        .bind(emp_id)
        .bind(kind.to_string())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(ts)
    }

    async fn latest_event(
        &self,
        emp_id: &str,
        kind: EventKind,
        day: NaiveDate,
    ) -> StoreResult<Option<NaiveDateTime>> {
        let (from, to) = day_bounds(day);
        let ts: Option<NaiveDateTime> = sqlx::query_scalar(
            "SELECT MAX(timestamp) FROM event_log \
             WHERE emp_id = ? AND kind = ? AND timestamp >= ? AND timestamp < ?",
        )
        .bind(emp_id)
        .bind(kind.to_string())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(ts)
    }

    async fn find_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<LoginLedgerEntry>> {
        let entry = sqlx::query_as::<_, LoginLedgerEntry>(
            "SELECT id, emp_id, log_date, login_time, logout_time, duration \
             FROM login_ledger WHERE emp_id = ? AND log_date = ?",
        )
        .bind(emp_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn insert_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
        login_time: NaiveTime,
    ) -> StoreResult<()> {
        sqlx::query("INSERT INTO login_ledger (emp_id, log_date, login_time) VALUES (?, ?, ?)")
            .bind(emp_id)
            .bind(day)
            .bind(login_time)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_login_ledger(
        &self,
        emp_id: &str,
        day: NaiveDate,
        logout_time: NaiveTime,
        duration: &str,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE login_ledger SET logout_time = ?, duration = ? \
             WHERE emp_id = ? AND log_date = ?",
        )
        .bind(logout_time)
        .bind(duration)
        .bind(emp_id)
        .bind(day)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn tasks_for_process(&self, process: &str) -> StoreResult<Vec<String>> {
        let tasks = sqlx::query_scalar::<_, String>(
            "SELECT task_name FROM process_tasks WHERE process_name = ?",
        )
        .bind(process)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn list_activities_for_processes(
        &self,
        processes: &[String],
        category: Option<Category>,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> StoreResult<Vec<ActivityReportRow>> {
        if processes.is_empty() {
            return Ok(Vec::new());
        }

        let categories: Vec<Category> = match category {
            Some(c) => vec![c],
            None => Category::ALL.to_vec(),
        };

        let mut rows = Vec::new();
        for category in categories {
            let sql = format!(
                "SELECT DISTINCT c.name, a.emp_id, a.activity_name, a.start_time, \
                 a.stop_time, a.total_duration \
                 FROM {} a JOIN credentials c ON a.emp_id = c.emp_id \
                 WHERE c.process IN ({}) AND a.start_time >= ? AND a.start_time < ?",
                category.table(),
                placeholders(processes.len())
            );
            let mut query = sqlx::query_as::<_, RawActivityRow>(&sql);
            for process in processes {
                query = query.bind(process);
            }
            query = query.bind(from).bind(to);

            rows.extend(
                query
                    .fetch_all(&self.pool)
                    .await?
                    .into_iter()
                    .map(|r| r.into_report(category)),
            );
        }

        rows.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(rows)
    }

    async fn list_open_for_processes(
        &self,
        processes: &[String],
        day: NaiveDate,
    ) -> StoreResult<Vec<LiveActivityRow>> {
        if processes.is_empty() {
            return Ok(Vec::new());
        }

        let (from, to) = day_bounds(day);
        let mut live = Vec::new();

        for category in Category::ALL {
            let sql = format!(
                "SELECT DISTINCT c.name, a.activity_name, a.start_time \
                 FROM {} a JOIN credentials c ON a.emp_id = c.emp_id \
                 WHERE c.process IN ({}) AND a.stop_time IS NULL \
                 AND a.start_time >= ? AND a.start_time < ?",
                category.table(),
                placeholders(processes.len())
            );
            let mut query = sqlx::query_as::<_, (String, String, NaiveDateTime)>(&sql);
            for process in processes {
                query = query.bind(process);
            }
            query = query.bind(from).bind(to);

            live.extend(query.fetch_all(&self.pool).await?.into_iter().map(
                |(name, activity_name, start_time)| LiveActivityRow {
                    name,
                    category,
                    activity_name,
                    start_time,
                },
            ));
        }

        Ok(live)
    }

    async fn list_login_ledger(
        &self,
        processes: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<LoginReportRow>> {
        if processes.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT DISTINCT c.name, l.emp_id, l.log_date, l.login_time, l.logout_time, l.duration \
             FROM login_ledger l JOIN credentials c ON l.emp_id = c.emp_id \
             WHERE c.process IN ({}) AND l.log_date >= ? AND l.log_date < ? \
             ORDER BY l.log_date DESC, l.login_time DESC",
            placeholders(processes.len())
        );
        let mut query = sqlx::query_as::<_, LoginReportRow>(&sql);
        for process in processes {
            query = query.bind(process);
        }
        query = query.bind(from).bind(to);

        Ok(query.fetch_all(&self.pool).await?)
    }
}
