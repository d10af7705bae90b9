use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    core::{ledger::LoginLedger, lifecycle::LifecycleManager},
    model::{
        employee::{CredRow, Credential, Role},
        ledger::EventKind,
    },
    models::{LoginReqDto, RegisterReq, TokenType},
    notify::{ActivityEvent, BroadcastNotifier, Notifier},
    store::MySqlStore,
};

/// User registration handler. Writes one credential row per process
/// affiliation; the login path merges them back into a single view.
pub async fn register(req: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let emp_id = req.emp_id.trim();

    if emp_id.is_empty() || req.password.is_empty() || req.processes.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "emp_id, password and at least one process are required"
        }));
    }

    if req.role.parse::<Role>().is_err() {
        return HttpResponse::BadRequest().json(json!({
            "error": "role must be 'associate' or 'manager'"
        }));
    }

    let hashed = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return HttpResponse::InternalServerError().finish();
        }
    };

    for process in &req.processes {
        if let Err(e) = sqlx::query(
            r#"
            INSERT INTO credentials (emp_id, name, password, role, email, process)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(emp_id)
        .bind(&req.name)
        .bind(&hashed)
        .bind(&req.role)
        .bind(&req.email)
        .bind(process)
        .execute(pool.get_ref())
        .await
        {
            error!(error = %e, emp_id, process, "Failed to register credential row");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    }

    HttpResponse::Created().json(json!({ "message": "User registered successfully" }))
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    role: String,
    processes: Vec<String>,
}

#[instrument(
    name = "auth_login",
    skip(req, pool, config, ledger, notifier),
    fields(emp_id = %req.emp_id)
)]
pub async fn login(
    req: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    ledger: web::Data<LoginLedger<MySqlStore>>,
    notifier: web::Data<BroadcastNotifier>,
) -> impl Responder {
    info!("Login request received");

    if req.emp_id.trim().is_empty() || req.password.is_empty() {
        return HttpResponse::BadRequest().body("Employee id and password required");
    }

    debug!("Fetching credential rows");

    let rows = match sqlx::query_as::<_, CredRow>(
        r#"
        SELECT id, emp_id, name, password, role, email, process
        FROM credentials
        WHERE emp_id = ?
        ORDER BY id
        "#,
    )
    .bind(req.emp_id.trim())
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Database error while fetching credentials");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let Some(cred) = Credential::merge(rows) else {
        info!("Invalid credentials: unknown employee");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    };

    if !verify_password(&req.password, &cred.password) {
        info!("Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified");

    let access_token = generate_access_token(
        &cred.emp_id,
        &cred.name,
        cred.role,
        &cred.processes,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let (refresh_token, _) = generate_refresh_token(
        &cred.emp_id,
        &cred.name,
        cred.role,
        &cred.processes,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    let now = Local::now().naive_local();
    if let Err(e) = ledger.record_login(&cred.emp_id, now).await {
        error!(error = %e, "Failed to record login in ledger");
        return HttpResponse::InternalServerError().finish();
    }

    notifier.emit(ActivityEvent::auth(
        &cred.emp_id,
        EventKind::Login,
        format!("Logged in at {}", now.format("%H:%M:%S")),
    ));

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
        role: cred.role.to_string(),
        processes: cred.processes,
    })
}

pub async fn refresh_token(req: HttpRequest, config: web::Data<Config>) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    let role = match claims.role.parse::<Role>() {
        Ok(r) => r,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    let access_token = generate_access_token(
        &claims.sub,
        &claims.name,
        role,
        &claims.process,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let (new_refresh_token, _) = generate_refresh_token(
        &claims.sub,
        &claims.name,
        role,
        &claims.process,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

/// Logout: ledger first, then the recovery sweep over any activities the
/// client left open, matching the order of the original logout flow.
pub async fn logout(
    auth: AuthUser,
    ledger: web::Data<LoginLedger<MySqlStore>>,
    manager: web::Data<LifecycleManager<MySqlStore>>,
    notifier: web::Data<BroadcastNotifier>,
) -> actix_web::Result<impl Responder> {
    let now = Local::now().naive_local();

    ledger.record_logout(&auth.emp_id, now).await?;
    manager.force_stop_all_open(&auth.emp_id, now).await?;

    notifier.emit(ActivityEvent::auth(
        &auth.emp_id,
        EventKind::Logout,
        format!("Logged out at {}", now.format("%H:%M:%S")),
    ));

    Ok(HttpResponse::NoContent().finish())
}
