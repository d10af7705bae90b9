use chrono::NaiveDate;

use crate::core::error::CoreError;
use crate::model::activity::ActiveSession;
use crate::store::ActivityStore;

/// Determines whether the employee has an open activity today, and of which
/// category. If more than one category holds an open row (a data-integrity
/// anomaly), the earliest-started record wins, so the answer is
/// deterministic. Read-only.
pub async fn resolve<S: ActivityStore>(
    store: &S,
    emp_id: &str,
    today: NaiveDate,
) -> Result<Option<ActiveSession>, CoreError> {
    let mut open = store.find_open_activities(emp_id, today).await?;
    open.sort_by_key(|record| record.start_time);

    Ok(open.into_iter().next().map(|record| ActiveSession {
        record_id: record.id,
        category: record.category,
        label: record.label,
        start_time: record.start_time,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::activity::Category;
    use crate::store::memory::MemoryStore;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[actix_web::test]
    async fn no_open_records_resolves_to_none() {
        let store = MemoryStore::new();
        let session = resolve(&store, "E1", day()).await.unwrap();
        assert!(session.is_none());
    }

    #[actix_web::test]
    async fn closed_records_are_ignored() {
        let store = MemoryStore::new();
        store
            .insert_open_activity("E1", Category::Task, "Data Entry", at(9, 0))
            .await
            .unwrap();
        store
            .close_activity("E1", Category::Task, "Data Entry", at(9, 0), at(10, 0), "01:00:00")
            .await
            .unwrap();

        assert!(resolve(&store, "E1", day()).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn earliest_started_category_wins() {
        let store = MemoryStore::new();
        store
            .insert_open_activity("E1", Category::Break, "Lunch Break", at(12, 0))
            .await
            .unwrap();
        store
            .insert_open_activity("E1", Category::Session, "Team Huddle", at(9, 30))
            .await
            .unwrap();

        let session = resolve(&store, "E1", day()).await.unwrap().unwrap();
        assert_eq!(session.category, Category::Session);
        assert_eq!(session.label, "Team Huddle");
        assert_eq!(session.start_time, at(9, 30));
    }

    #[actix_web::test]
    async fn other_employees_are_invisible() {
        let store = MemoryStore::new();
        store
            .insert_open_activity("E2", Category::Break, "Break 1", at(10, 0))
            .await
            .unwrap();

        assert!(resolve(&store, "E1", day()).await.unwrap().is_none());
    }
}
