use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Result, anyhow};

use crate::{
    api::{attendance, report, shift, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};

type LimiterConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-route-group rate limits, built once at startup.
#[derive(Clone)]
pub struct RateLimits {
    kiosk: LimiterConfig,
    login: LimiterConfig,
    protected: LimiterConfig,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            kiosk: build_limiter(config.rate_kiosk_per_min)?,
            login: build_limiter(config.rate_login_per_min)?,
            protected: build_limiter(config.rate_protected_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<LimiterConfig> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {requests_per_min}/min"))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    // Public kiosk routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&limits.login))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register-cpf")
                    .wrap(Governor::new(&limits.kiosk))
                    .route(web::post().to(handlers::register_cpf)),
            )
            .service(
                web::resource("/validate-cpf")
                    .wrap(Governor::new(&limits.kiosk))
                    .route(web::post().to(handlers::validate_cpf)),
            ),
    );

    cfg.service(
        web::scope("/attendance")
            .wrap(Governor::new(&limits.kiosk))
            .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
            .service(web::resource("/check-out").route(web::post().to(attendance::check_out)))
            .service(web::resource("/window").route(web::get().to(attendance::current_window))),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(Governor::new(&limits.protected)) // rate limiting
            .service(
                web::scope("/users").service(
                    web::resource("")
                        .route(web::post().to(user::create_user))
                        .route(web::get().to(user::list_users)),
                ),
            )
            .service(
                web::scope("/shifts")
                    // /shifts
                    .service(
                        web::resource("")
                            .route(web::post().to(shift::create_shift))
                            .route(web::get().to(shift::list_shifts)),
                    )
                    // /shifts/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(shift::get_shift))
                            .route(web::put().to(shift::update_shift))
                            .route(web::delete().to(shift::delete_shift)),
                    ),
            )
            .service(
                web::resource("/attendance").route(web::get().to(attendance::list_attendances)),
            )
            .service(web::resource("/reports").route(web::get().to(report::report))),
    );
}
