use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use element_loyalty_backend::{
    config::Config,
    database::create_pool,
    external::PredictionClient,
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = Arc::new(
        create_pool(&config.database)
            .await
            .expect("Failed to create database connection pool"),
    );

    if config.text_api.api_key.is_empty() {
        log::warn!("Text generation API key is not set; predictions will fail");
    }

    let predictor = Arc::new(
        PredictionClient::new(config.chart_api.clone(), config.text_api.clone())
            .expect("Failed to build HTTP client"),
    );

    let identity_service = IdentityService::new(pool.clone(), predictor.clone());
    let prediction_service = PredictionService::new(pool.clone(), predictor);
    let menu_service = MenuService::new(pool.clone());
    let coupon_service = CouponService::new(pool.clone());
    let restaurant_service = RestaurantService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors(&cors_config))
            .app_data(handlers::json_config())
            .app_data(web::Data::from(pool.clone()))
            .app_data(web::Data::new(identity_service.clone()))
            .app_data(web::Data::new(prediction_service.clone()))
            .app_data(web::Data::new(menu_service.clone()))
            .app_data(web::Data::new(coupon_service.clone()))
            .app_data(web::Data::new(restaurant_service.clone()))
            .configure(swagger_config)
            .configure(handlers::health_config)
            .configure(handlers::api_config)
            .default_service(web::to(handlers::route_not_found))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
