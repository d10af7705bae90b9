use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Associate,
    Manager,
}

/// One row of the credentials table. A multi-process employee has one row
/// per process affiliation.
#[derive(Debug, FromRow)]
pub struct CredRow {
    pub id: u64,
    pub emp_id: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub email: String,
    pub process: String,
}

/// Aggregate view over an employee's credential rows.
#[derive(Debug, Clone)]
pub struct Credential {
    pub emp_id: String,
    pub name: String,
    /// Argon2 hash.
    pub password: String,
    pub role: Role,
    pub processes: Vec<String>,
}

impl Credential {
    /// Folds credential rows into a single view: the first row supplies the
    /// identity fields, processes are collected from every row. Returns
    /// `None` for an unknown employee or an unrecognized stored role.
    pub fn merge(rows: Vec<CredRow>) -> Option<Credential> {
        let first = rows.first()?;
        let role = first.role.parse().ok()?;
        Some(Credential {
            emp_id: first.emp_id.clone(),
            name: first.name.clone(),
            password: first.password.clone(),
            role,
            processes: rows.iter().map(|r| r.process.clone()).collect(),
        })
    }
}
