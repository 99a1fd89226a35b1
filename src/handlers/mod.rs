pub mod auth;
pub mod health;
pub mod restaurant;

pub use auth::auth_config;
pub use health::{health_config, route_not_found};
pub use restaurant::restaurant_config;

use actix_web::web;

/// Everything mounted under `/api`.
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth_config)
            .configure(restaurant_config),
    );
}

/// Malformed or mistyped JSON bodies surface as `VALIDATION_ERROR`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(10 * 1024 * 1024)
        .error_handler(|err, _req| {
            crate::error::AppError::ValidationError(err.to_string()).into()
        })
}
