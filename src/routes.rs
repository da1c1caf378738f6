use crate::{
    api::{attendance, branch, profile, schedule},
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
                web::resource("/register/employee")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register_employee)),
            )
            .service(
                web::resource("/register/employer")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register_employer)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::put().to(attendance::clock_out)),
                    )
                    .service(web::resource("/today").route(web::get().to(attendance::today)))
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(attendance::monthly_summary)),
                    ),
            )
            .service(
                web::scope("/schedules")
                    // /schedules
                    .service(
                        web::resource("")
                            .route(web::get().to(schedule::list_schedules))
                            .route(web::post().to(schedule::upsert_schedule)),
                    )
                    // /schedules/{schedule_id}
                    .service(
                        web::resource("/{schedule_id}")
                            .route(web::delete().to(schedule::delete_schedule)),
                    ),
            )
            .service(
                web::scope("/branch")
                    .service(web::resource("").route(web::get().to(branch::get_branch)))
                    .service(web::resource("/qr").route(web::get().to(branch::qr_code)))
                    .service(web::resource("/overview").route(web::get().to(branch::overview)))
                    // /branch/employees/{employee_id}/approve
                    .service(
                        web::resource("/employees/{employee_id}/approve")
                            .route(web::put().to(branch::approve_employee)),
                    )
                    // /branch/employees/{employee_id}
                    .service(
                        web::resource("/employees/{employee_id}")
                            .route(web::delete().to(branch::reject_employee)),
                    ),
            )
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::update_profile)),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// CLOCK-IN
//  └─ POST /attendance/clock-in with qr_token scanned at the store
//       └─ token carries branch + issue date, rotates at midnight
