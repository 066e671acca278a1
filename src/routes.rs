use crate::{
    api::{address, education, employee, employee_image, permission, request, role, team},
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

// Per-route limiter. Governor is not shareable across wraps, so each
// wrapped resource gets its own instance. A zero burst size makes the
// builder refuse, so the rate is clamped to at least one per minute.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = 60_000 / requests_per_min as u64;
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Public auth routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/jwt/create")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(build_limiter(config.rate_register_per_min))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(build_limiter(config.rate_refresh_per_min))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // API routes. Authentication is enforced per handler through the
    // AuthUser extractor: some list endpoints are readable anonymously.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(
                web::scope("/permissions")
                    .service(
                        web::resource("")
                            .route(web::get().to(permission::list_permissions))
                            .route(web::post().to(permission::create_permission)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(permission::get_permission))
                            .route(web::patch().to(permission::update_permission))
                            .route(web::delete().to(permission::delete_permission)),
                    ),
            )
            .service(
                web::scope("/teams")
                    .service(
                        web::resource("")
                            .route(web::get().to(team::list_teams))
                            .route(web::post().to(team::create_team)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(team::get_team))
                            .route(web::patch().to(team::update_team))
                            .route(web::delete().to(team::delete_team)),
                    ),
            )
            .service(
                web::scope("/roles")
                    .service(
                        web::resource("")
                            .route(web::get().to(role::list_roles))
                            .route(web::post().to(role::create_role)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(role::get_role))
                            .route(web::patch().to(role::update_role))
                            .route(web::delete().to(role::delete_role)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(web::resource("").route(web::get().to(employee::list_employees)))
                    // fixed segments before the {employee_id} matcher
                    .service(
                        web::resource("/me")
                            .route(web::get().to(employee::me))
                            .route(web::put().to(employee::update_me)),
                    )
                    .service(
                        web::resource("/assign_role")
                            .route(web::post().to(employee::assign_role)),
                    )
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::patch().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    .service(
                        web::resource("/{employee_id}/educations")
                            .route(web::get().to(education::list_educations))
                            .route(web::post().to(education::create_education)),
                    )
                    .service(
                        web::resource("/{employee_id}/address")
                            .route(web::get().to(address::get_address))
                            .route(web::post().to(address::create_address)),
                    ),
            )
            .service(
                web::scope("/requests")
                    .service(
                        web::resource("")
                            .route(web::get().to(request::list_requests))
                            .route(web::post().to(request::create_request)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(request::get_request))
                            .route(web::patch().to(request::update_request))
                            .route(web::delete().to(request::delete_request)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::patch().to(request::approve_request)),
                    )
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::patch().to(request::reject_request)),
                    ),
            )
            .service(
                web::resource("/employee-image")
                    .route(web::get().to(employee_image::get_image))
                    .route(web::put().to(employee_image::put_image)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_tolerates_zero_rate() {
        // A misconfigured RATE_*_PER_MIN of 0 must not abort startup.
        let _ = build_limiter(0);
        let _ = build_limiter(60);
    }
}
