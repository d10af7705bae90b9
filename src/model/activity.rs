use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Activity categories, each mapped to its own history table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Task,
    Break,
    Session,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Task, Category::Break, Category::Session];

    /// Fixed storage handle per category. The table name never comes from
    /// request data.
    pub fn table(self) -> &'static str {
        match self {
            Category::Task => "task_records",
            Category::Break => "break_records",
            Category::Session => "session_records",
        }
    }
}

/// An activity row with a null stop timestamp.
#[derive(Debug, Clone)]
pub struct OpenActivity {
    pub id: u64,
    pub category: Category,
    pub label: String,
    pub start_time: NaiveDateTime,
}

/// What the resolver reports for an employee with an open activity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActiveSession {
    pub record_id: u64,
    pub category: Category,
    pub label: String,
    pub start_time: NaiveDateTime,
}

/// Historical activity row joined with the credential display name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityReportRow {
    pub name: String,
    pub emp_id: String,
    pub category: Category,
    pub activity_name: String,
    pub start_time: NaiveDateTime,
    pub stop_time: Option<NaiveDateTime>,
    pub total_duration: Option<String>,
}

/// A currently-open activity on the live dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveActivityRow {
    pub name: String,
    pub category: Category,
    pub activity_name: String,
    pub start_time: NaiveDateTime,
}
