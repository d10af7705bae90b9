use crate::api::activity::{ExitSignal, StartActivityReq, StopActivityReq};
use crate::model::activity::{ActiveSession, ActivityReportRow, Category, LiveActivityRow};
use crate::model::employee::Role;
use crate::model::ledger::LoginReportRow;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Adherence Tracker API",
        version = "1.0.0",
        description = r#"
## Workforce Adherence Tracker

This API tracks daily attendance and timestamped work activity for
process-based teams.

### 🔹 Key Features
- **Activity Tracking**
  - Start/stop tasks, breaks and auxiliary sessions with server-computed durations
- **Attendance Ledger**
  - One login/logout row per employee per day, first login and last logout win
- **Manager Reports**
  - Historical activity, login ledger and live open-activity views per process
- **Recovery**
  - Tab-close beacon and logout sweep close anything left open

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Report endpoints additionally require the **manager** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::activity::start_activity,
        crate::api::activity::stop_activity,
        crate::api::activity::stop_on_exit,
        crate::api::activity::current_activity,

        crate::api::report::activity_report,
        crate::api::report::login_report,
        crate::api::report::live_report,

        crate::api::process::process_tasks
    ),
    components(
        schemas(
            StartActivityReq,
            StopActivityReq,
            ExitSignal,
            Category,
            Role,
            ActiveSession,
            ActivityReportRow,
            LiveActivityRow,
            LoginReportRow
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Activity", description = "Activity lifecycle APIs"),
        (name = "Report", description = "Manager reporting APIs"),
        (name = "Process", description = "Process configuration APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(openapi::Components::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
