use crate::{
    api::{
        attendance::{self, SELFIE_JSON_LIMIT},
        staff, timetable,
    },
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

const TIMETABLE_JSON_LIMIT: usize = 256 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond((60_000 / requests_per_min as u64).max(1))
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            // period and burst are both clamped to at least one
            .expect("valid rate limiter settings");
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/staff/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::staff_login)),
            )
            .service(
                web::resource("/admin/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::admin_login)),
            )
            .service(
                web::resource("/vice-principal/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::vice_principal_login)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(staff::me)))
            .service(
                web::scope("/staff")
                    // /staff
                    .service(
                        web::resource("")
                            .route(web::post().to(staff::create_staff))
                            .route(web::get().to(staff::list_staff)),
                    )
                    // /staff/{id}
                    .service(web::resource("/{id}").route(web::get().to(staff::get_staff))),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .app_data(web::JsonConfig::default().limit(SELFIE_JSON_LIMIT))
                            .route(web::post().to(attendance::mark_attendance))
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    .service(
                        web::resource("/today").route(web::get().to(attendance::today_status)),
                    )
                    .service(
                        web::resource("/summary")
                            .route(web::get().to(attendance::attendance_summary)),
                    )
                    .service(
                        web::resource("/export").route(web::get().to(attendance::export_attendance)),
                    ),
            )
            .service(
                web::scope("/timetable")
                    // /timetable/request
                    .service(
                        web::resource("/request")
                            .route(web::get().to(timetable::timetable_request)),
                    )
                    // /timetable/generate
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(timetable::generate_timetable)),
                    )
                    // /timetable/{date}
                    .service(
                        web::resource("/{date}")
                            .app_data(web::JsonConfig::default().limit(TIMETABLE_JSON_LIMIT))
                            .route(web::put().to(timetable::publish_timetable))
                            .route(web::get().to(timetable::get_timetable)),
                    )
                    // /timetable/{date}/mine
                    .service(
                        web::resource("/{date}/mine").route(web::get().to(timetable::my_timetable)),
                    ),
            ),
    );
}
