use crate::{
    api::{admin, attendance, employee, health},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;
use tracing::warn;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            warn!(requests_per_min, "Rejected rate limit, using the governor default");
            Default::default()
        });
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(web::resource("/health").route(web::get().to(health::health)));

    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/employee")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::employee_login)),
            )
            .service(
                web::resource("/admin")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::admin_login)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    .route("/entry", web::post().to(attendance::register_entry))
                    // /attendance/breaks/{smoking|lunch}/...
                    .route("/breaks/{kind}/start", web::post().to(attendance::start_break))
                    .route("/breaks/{kind}/end", web::post().to(attendance::end_break))
                    .route("/exit", web::post().to(attendance::register_exit))
                    .route("/today", web::get().to(attendance::today)),
            )
            .service(
                web::scope("/admin")
                    // /admin/employees
                    .service(
                        web::resource("/employees")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /admin/employees/{id}
                    .service(
                        web::resource("/employees/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/attendance").route(web::get().to(admin::attendance_report)),
                    )
                    .service(
                        web::resource("/attendance/{employee_id}/{date}")
                            .route(web::get().to(admin::attendance_for_day)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ POST /auth/employee  { document_number }  -> employee token
//  └─ POST /auth/admin     { username, password } -> admin token

// API REQUEST
//  └─ Authorization: Bearer <token>
