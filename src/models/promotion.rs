use super::{Element, PromotionStatus};
use crate::error::{AppError, AppResult};
use crate::utils::{optional_text, parse_date, require_positive_id, validate_range};
use chrono::NaiveDate;
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromotionRequest {
    pub element: Vec<Element>,
    pub description: Option<String>,
    #[schema(example = 20.0)]
    pub discount_value: f64,
    #[schema(example = "2024-01-01")]
    pub start_date: String,
    #[schema(example = "2024-12-31")]
    pub end_date: String,
}

impl CreatePromotionRequest {
    pub fn validate(self) -> AppResult<NewPromotionGroup> {
        if self.element.is_empty() {
            return Err(AppError::ValidationError(
                "element: at least one element is required".to_string(),
            ));
        }
        let start_date = parse_date("start_date", &self.start_date)?;
        let end_date = parse_date("end_date", &self.end_date)?;
        if end_date < start_date {
            return Err(AppError::ValidationError(
                "end_date: must not be before start_date".to_string(),
            ));
        }
        Ok(NewPromotionGroup {
            elements: self.element,
            description: optional_text("description", self.description.as_deref(), 1, 500)?,
            discount_value: validate_range("discount_value", self.discount_value, 0.0, 100.0)?,
            start_date,
            end_date,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewPromotionGroup {
    pub elements: Vec<Element>,
    pub description: Option<String>,
    pub discount_value: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatePromotionResponse {
    pub promotion_group_id: i64,
    pub menu_count: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePromotionGroupRequest {
    pub group_id: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<PromotionStatus>,
}

impl UpdatePromotionGroupRequest {
    pub fn validate(self) -> AppResult<(i64, PromotionGroupChanges)> {
        let group_id = require_positive_id("group_id", self.group_id)?;
        let changes = PromotionGroupChanges {
            start_date: self
                .start_date
                .as_deref()
                .map(|d| parse_date("start_date", d))
                .transpose()?,
            end_date: self
                .end_date
                .as_deref()
                .map(|d| parse_date("end_date", d))
                .transpose()?,
            status: self.status,
        };
        // A single date is checked against the stored one by the database.
        if let (Some(start), Some(end)) = (changes.start_date, changes.end_date) {
            if end < start {
                return Err(AppError::ValidationError(
                    "end_date: must not be before start_date".to_string(),
                ));
            }
        }
        Ok((group_id, changes))
    }
}

/// Fields left `None` keep their stored value (COALESCE in SQL).
#[derive(Debug, Clone, Default)]
pub struct PromotionGroupChanges {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PromotionStatus>,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct NextGroupRow {
    pub next_group: i64,
}

/// One promotion group aggregated over its member rows.
#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
pub struct PromotionGroupResponse {
    pub promotion_group_id: i64,
    #[schema(example = "3,7,9")]
    pub menu_ids: String,
    pub description: Option<String>,
    pub discount_value: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PromotionStatus,
    pub menu_count: i64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct ActivePromotionRow {
    pub id: i64,
    pub discount_value: f64,
}
