use crate::{
    api::{activity, process, report},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            ),
    );

    // Tab-close beacon: sendBeacon carries no Authorization header, so this
    // stays outside the authenticated scope.
    cfg.service(
        web::resource("/activity/exit")
            .wrap(login_limiter.clone())
            .route(web::post().to(activity::stop_on_exit)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/logout").route(web::post().to(handlers::logout)))
            .service(
                web::scope("/activity")
                    .service(
                        web::resource("/start").route(web::post().to(activity::start_activity)),
                    )
                    .service(web::resource("/stop").route(web::post().to(activity::stop_activity)))
                    .service(
                        web::resource("/current").route(web::get().to(activity::current_activity)),
                    ),
            )
            .service(
                web::scope("/report")
                    .service(
                        web::resource("/activities").route(web::get().to(report::activity_report)),
                    )
                    .service(web::resource("/logins").route(web::get().to(report::login_report)))
                    .service(web::resource("/live").route(web::get().to(report::live_report))),
            )
            .service(
                web::scope("/process").service(
                    web::resource("/{process}/tasks")
                        .route(web::get().to(process::process_tasks)),
                ),
            ),
    );
}
