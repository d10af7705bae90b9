use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::core::error::CoreError;
use crate::store::{ActivityStore, MySqlStore};

/// Task labels configured for a process
///
/// Associates fetch their own process's list to populate the start menu;
/// only the `task` category is validated against it.
#[utoipa::path(
    get,
    path = "/api/v1/process/{process}/tasks",
    params(
        ("process", Path, description = "Process name")
    ),
    responses(
        (status = 200, description = "Configured task labels", body = Object, example = json!({
            "process": "probe",
            "tasks": ["Data Entry", "QC Review"]
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Process not among the caller's affiliations"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Process"
)]
pub async fn process_tasks(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let process = path.into_inner();

    if !auth.oversees(&process) {
        return Err(actix_web::error::ErrorForbidden(
            "Process not among your affiliations",
        ));
    }

    let tasks = store
        .tasks_for_process(&process)
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(json!({ "process": process, "tasks": tasks })))
}
