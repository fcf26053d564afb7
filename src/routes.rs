use crate::{
    api::{
        attendance, audit, benefit, dashboard, employee, holiday, pay_component, payroll_period,
    },
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
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    // /employees/{id}/role
                    .service(
                        web::resource("/{id}/role").route(web::put().to(employee::change_role)),
                    ),
            )
            .service(
                web::scope("/applicants")
                    .service(web::resource("").route(web::get().to(employee::list_applicants)))
                    .service(
                        web::resource("/status").route(web::get().to(employee::applicant_status)),
                    ),
            )
            .service(web::resource("/profile").route(web::put().to(employee::update_profile)))
            .service(
                web::scope("/payroll")
                    .service(
                        web::scope("/components")
                            .service(
                                web::resource("")
                                    .route(web::post().to(pay_component::create_component))
                                    .route(web::get().to(pay_component::list_components)),
                            )
                            .service(
                                web::resource("/evaluate")
                                    .route(web::post().to(pay_component::evaluate_component)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(pay_component::get_component))
                                    .route(web::put().to(pay_component::update_component))
                                    .route(web::delete().to(pay_component::delete_component)),
                            ),
                    )
                    .service(
                        web::scope("/holidays")
                            .service(
                                web::resource("")
                                    .route(web::post().to(holiday::create_holiday))
                                    .route(web::get().to(holiday::list_holidays)),
                            )
                            .service(
                                web::resource("/available")
                                    .route(web::get().to(holiday::available_holidays)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(holiday::get_holiday))
                                    .route(web::put().to(holiday::update_holiday))
                                    .route(web::delete().to(holiday::delete_holiday)),
                            ),
                    )
                    .service(
                        web::scope("/periods")
                            .service(
                                web::resource("")
                                    .route(web::post().to(payroll_period::create_period))
                                    .route(web::get().to(payroll_period::list_periods)),
                            )
                            .service(
                                web::resource("/{id}/details")
                                    .route(web::get().to(payroll_period::period_details)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(payroll_period::get_period))
                                    .route(web::put().to(payroll_period::update_period))
                                    .route(web::delete().to(payroll_period::delete_period)),
                            ),
                    ),
            )
            .service(
                web::scope("/benefits")
                    .service(
                        web::resource("/periods").route(web::get().to(benefit::benefit_periods)),
                    )
                    .service(
                        web::resource("/pending").route(web::get().to(benefit::pending_employees)),
                    )
                    .service(
                        web::resource("/completed")
                            .route(web::get().to(benefit::completed_employees)),
                    )
                    .service(
                        web::resource("/details").route(web::get().to(benefit::benefit_details)),
                    )
                    .service(
                        web::resource("/files").route(web::post().to(benefit::upload_file)),
                    )
                    .service(
                        web::resource("/files/{id}").route(web::delete().to(benefit::delete_file)),
                    )
                    .service(
                        web::resource("/release/{id}")
                            .route(web::post().to(benefit::release_payslip)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(web::resource("").route(web::get().to(attendance::list_attendance))),
            )
            .service(
                web::scope("/dashboard")
                    .service(web::resource("/hr").route(web::get().to(dashboard::hr_summary))),
            )
            .service(web::resource("/audit").route(web::get().to(audit::list_audit))),
    );
}
