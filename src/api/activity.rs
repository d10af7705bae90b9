use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::error::CoreError;
use crate::core::lifecycle::{LifecycleManager, StopOutcome};
use crate::core::resolver;
use crate::model::activity::Category;
use crate::store::MySqlStore;

#[derive(Deserialize, ToSchema)]
pub struct StartActivityReq {
    /// `task`, `break` or `session`.
    #[serde(alias = "type")]
    pub category: String,
    pub label: String,
}

#[derive(Deserialize, ToSchema)]
pub struct StopActivityReq {
    #[serde(alias = "type")]
    pub category: String,
}

/// Tab-close beacon payload. The beacon transport carries no credentials.
#[derive(Deserialize, ToSchema)]
pub struct ExitSignal {
    pub emp_id: String,
}

fn parse_category(raw: &str) -> Result<Category, CoreError> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|_| CoreError::InvalidCategory)
}

/// Start an activity
#[utoipa::path(
    post,
    path = "/api/v1/activity/start",
    request_body = StartActivityReq,
    responses(
        (status = 200, description = "Activity started", body = Object, example = json!({
            "status": "success"
        })),
        (status = 400, description = "Invalid category or task label"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn start_activity(
    auth: AuthUser,
    manager: web::Data<LifecycleManager<MySqlStore>>,
    req: web::Json<StartActivityReq>,
) -> actix_web::Result<impl Responder> {
    let category = parse_category(&req.category)?;
    let now = Local::now().naive_local();

    manager
        .start(&auth.emp_id, &auth.processes, category, req.label.trim(), now)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "status": "success" })))
}

/// Stop the open activity in a category
///
/// The open record is resolved server-side; the client supplies only the
/// category. Stopping with nothing open is reported, not treated as an
/// error.
#[utoipa::path(
    post,
    path = "/api/v1/activity/stop",
    request_body = StopActivityReq,
    responses(
        (status = 200, description = "Activity stopped, or nothing was open", body = Object, example = json!({
            "status": "success", "label": "Data Entry", "duration": "00:45:30"
        })),
        (status = 400, description = "Invalid category"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn stop_activity(
    auth: AuthUser,
    manager: web::Data<LifecycleManager<MySqlStore>>,
    req: web::Json<StopActivityReq>,
) -> actix_web::Result<impl Responder> {
    let category = parse_category(&req.category)?;
    let now = Local::now().naive_local();

    match manager.stop(&auth.emp_id, category, now).await {
        Ok(StopOutcome::Closed { label, duration }) => Ok(HttpResponse::Ok().json(json!({
            "status": "success",
            "label": label,
            "duration": duration
        }))),
        Ok(StopOutcome::NothingOpen) | Err(CoreError::NoMatchingRecord { .. }) => {
            Ok(HttpResponse::Ok().json(json!({ "status": "no_open_activity" })))
        }
        Err(e) => Err(e.into()),
    }
}

/// Tab-close recovery beacon
///
/// Best-effort signal sent before unload; it may never arrive. Closes every
/// open record for the employee and always answers 204 so the unloading
/// client never waits on an error path.
#[utoipa::path(
    post,
    path = "/activity/exit",
    request_body = ExitSignal,
    responses(
        (status = 204, description = "Sweep attempted")
    ),
    tag = "Activity"
)]
pub async fn stop_on_exit(
    manager: web::Data<LifecycleManager<MySqlStore>>,
    req: web::Json<ExitSignal>,
) -> impl Responder {
    let now = Local::now().naive_local();

    if let Err(e) = manager.force_stop_all_open(&req.emp_id, now).await {
        tracing::error!(error = %e, emp_id = %req.emp_id, "Exit sweep failed");
    }

    HttpResponse::NoContent().finish()
}

/// Current open activity, if any
#[utoipa::path(
    get,
    path = "/api/v1/activity/current",
    responses(
        (status = 200, description = "Active session or null", body = Object, example = json!({
            "active_session": {
                "record_id": 7,
                "category": "task",
                "label": "Data Entry",
                "start_time": "2025-06-02T09:00:00"
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Activity"
)]
pub async fn current_activity(
    auth: AuthUser,
    manager: web::Data<LifecycleManager<MySqlStore>>,
) -> actix_web::Result<impl Responder> {
    let today = Local::now().date_naive();
    let session = resolver::resolve(manager.store(), &auth.emp_id, today).await?;

    Ok(HttpResponse::Ok().json(json!({ "active_session": session })))
}
