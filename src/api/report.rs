use actix_web::{HttpResponse, Responder, web};
use chrono::{Days, Local, NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::core::error::CoreError;
use crate::model::activity::{ActivityReportRow, Category};
use crate::model::ledger::LoginReportRow;
use crate::store::{ActivityStore, MySqlStore};

#[derive(Deserialize, IntoParams)]
pub struct ReportQuery {
    pub process: String,
    /// `YYYY-MM-DD`; defaults to today.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive; defaults to today.
    pub end_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct LiveQuery {
    pub process: String,
}

/// Half-open day range for the query, falling back to today when either
/// bound is missing or unparsable.
fn resolve_range(start: Option<&str>, end: Option<&str>) -> (NaiveDate, NaiveDate) {
    let today = Local::now().date_naive();
    let parsed = |s: Option<&str>| s.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());

    match (parsed(start), parsed(end)) {
        (Some(from), Some(to)) => (from, to + Days::new(1)),
        _ => (today, today + Days::new(1)),
    }
}

fn authorize_process(auth: &AuthUser, process: &str) -> actix_web::Result<()> {
    auth.require_manager()?;
    if !auth.oversees(process) {
        return Err(actix_web::error::ErrorForbidden(
            "Unauthorized process selected",
        ));
    }
    Ok(())
}

/// Historical activity rows for a process
#[utoipa::path(
    get,
    path = "/api/v1/report/activities",
    params(ReportQuery),
    responses(
        (status = 200, description = "Activity rows, newest first", body = [ActivityReportRow]),
        (status = 400, description = "Invalid category"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a manager, or process not overseen"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn activity_report(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    authorize_process(&auth, &query.process)?;

    let category = match query.category.as_deref() {
        Some(raw) => Some(
            raw.parse::<Category>()
                .map_err(|_| CoreError::InvalidCategory)?,
        ),
        None => None,
    };

    let (from_day, to_day) = resolve_range(query.start_date.as_deref(), query.end_date.as_deref());
    let rows = store
        .list_activities_for_processes(
            &[query.process.clone()],
            category,
            from_day.and_time(NaiveTime::MIN),
            to_day.and_time(NaiveTime::MIN),
        )
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Daily login/logout ledger for a process
#[utoipa::path(
    get,
    path = "/api/v1/report/logins",
    params(ReportQuery),
    responses(
        (status = 200, description = "Ledger rows, newest first", body = [LoginReportRow]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a manager, or process not overseen"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn login_report(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    authorize_process(&auth, &query.process)?;

    let (from_day, to_day) = resolve_range(query.start_date.as_deref(), query.end_date.as_deref());
    let rows = store
        .list_login_ledger(&[query.process.clone()], from_day, to_day)
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Live dashboard: open activities and per-category counts
#[utoipa::path(
    get,
    path = "/api/v1/report/live",
    params(LiveQuery),
    responses(
        (status = 200, description = "Open activities for today", body = Object, example = json!({
            "counts": { "task": 4, "break": 1, "session": 2 },
            "activities": []
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a manager, or process not overseen"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Report"
)]
pub async fn live_report(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    query: web::Query<LiveQuery>,
) -> actix_web::Result<impl Responder> {
    authorize_process(&auth, &query.process)?;

    let today = Local::now().date_naive();
    let rows = store
        .list_open_for_processes(&[query.process.clone()], today)
        .await
        .map_err(CoreError::from)?;

    let count_of = |category: Category| rows.iter().filter(|r| r.category == category).count();
    let counts = json!({
        "task": count_of(Category::Task),
        "break": count_of(Category::Break),
        "session": count_of(Category::Session),
    });

    Ok(HttpResponse::Ok().json(json!({ "counts": counts, "activities": rows })))
}
