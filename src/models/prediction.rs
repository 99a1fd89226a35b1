use sea_orm::FromQueryResult;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, FromQueryResult)]
pub struct PredictionTextRow {
    pub prediction_text: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PredictionResponse {
    pub message: String,
}
