use super::CouponStatus;
use crate::error::AppResult;
use crate::utils::{require_positive_id, require_text};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueCouponRequest {
    #[schema(example = 12)]
    pub promotion_id: i64,
    #[serde(rename = "userId")]
    #[schema(example = 1)]
    pub user_id: i64,
}

impl IssueCouponRequest {
    pub fn validate(self) -> AppResult<Self> {
        Ok(Self {
            promotion_id: require_positive_id("promotion_id", self.promotion_id)?,
            user_id: require_positive_id("userId", self.user_id)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueCouponResponse {
    #[schema(example = "PROMO-1A2B3C4D")]
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemCouponRequest {
    #[schema(example = "PROMO-1A2B3C4D")]
    pub code: String,
}

impl RedeemCouponRequest {
    pub fn validate(self) -> AppResult<String> {
        require_text("code", &self.code, 5, 50)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RedeemCouponResponse {
    pub discount_value: f64,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct CouponRow {
    pub coupon_id: i64,
    pub status: CouponStatus,
    pub code: String,
    pub discount_value: f64,
}
