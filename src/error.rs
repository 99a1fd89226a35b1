use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, RuntimeErr, SqlxError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Bad gateway: {0}")]
    BadGateway(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// Failures nobody anticipated; these get logged with request context.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::DatabaseError(_)
                | AppError::ConfigError(_)
                | AppError::InternalError(_)
                | AppError::SerdeJsonError(_)
        )
    }

    /// Turns a unique-constraint violation into `Conflict(message)`; any other
    /// database error is passed through unchanged.
    pub fn unique_violation_as_conflict(err: DbErr, message: &str) -> Self {
        let violation = matches!(
            driver_error(&err),
            Some(SqlxError::Database(e)) if e.is_unique_violation()
        );
        if violation {
            return AppError::Conflict(message.to_string());
        }
        AppError::DatabaseError(err)
    }

    /// Turns a foreign-key violation into `NotFound(message)`.
    pub fn foreign_key_violation_as_not_found(err: DbErr, message: &str) -> Self {
        let violation = matches!(
            driver_error(&err),
            Some(SqlxError::Database(e)) if e.is_foreign_key_violation()
        );
        if violation {
            return AppError::NotFound(message.to_string());
        }
        AppError::DatabaseError(err)
    }

    /// Turns a CHECK constraint rejection into `ValidationError(message)`.
    pub fn check_violation_as_invalid(err: DbErr, message: &str) -> Self {
        let violation = matches!(
            driver_error(&err),
            Some(SqlxError::Database(e)) if e.is_check_violation()
        );
        if violation {
            return AppError::ValidationError(message.to_string());
        }
        AppError::DatabaseError(err)
    }
}

fn driver_error(err: &DbErr) -> Option<&SqlxError> {
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => Some(e),
        _ => None,
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) | AppError::ReqwestError(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_)
            | AppError::ConfigError(_)
            | AppError::InternalError(_)
            | AppError::SerdeJsonError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::BadRequest(msg) => {
                log::warn!("Bad request: {msg}");
                ("BAD_REQUEST", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                ("AUTH_ERROR", msg.clone())
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => {
                log::warn!("Conflict: {msg}");
                ("CONFLICT", msg.clone())
            }
            AppError::ServiceUnavailable(msg) => {
                log::error!("Upstream unavailable: {msg}");
                ("SERVICE_UNAVAILABLE", msg.clone())
            }
            AppError::ReqwestError(err) => {
                log::error!("Upstream request failed: {err}");
                ("SERVICE_UNAVAILABLE", "Upstream service unavailable".to_string())
            }
            AppError::BadGateway(msg) => {
                log::error!("Upstream returned invalid data: {msg}");
                ("BAD_GATEWAY", msg.clone())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            _ => {
                log::error!("Internal error: {self}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
