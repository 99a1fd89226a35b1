use crate::database::{DbPool, statement, queries};
use actix_web::{HttpResponse, Result, web};
use chrono::Utc;
use sea_orm::ConnectionTrait;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service banner"))
)]
pub async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "message": "Restaurant API v1.0",
        "status": "running",
        "timestamp": Utc::now().to_rfc3339()
    })))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable"),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health(pool: web::Data<DbPool>) -> Result<HttpResponse> {
    let pool = pool.get_ref();
    match pool.execute(statement(pool, queries::PING, vec![])).await {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "status": "healthy",
            "database": "connected"
        }))),
        Err(e) => {
            log::error!("Health check failed: {e}");
            Ok(HttpResponse::ServiceUnavailable().json(json!({
                "status": "unhealthy",
                "database": "disconnected"
            })))
        }
    }
}

pub async fn route_not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(json!({
        "success": false,
        "error": {
            "code": "NOT_FOUND",
            "message": "Route not found"
        }
    })))
}

pub fn health_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health));
}
