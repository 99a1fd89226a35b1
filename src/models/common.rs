use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiError,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct IdRow {
    pub id: i64,
}
