use super::prediction_service::today;
use crate::database::{execute, fetch_one, queries};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::generate_coupon_code;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::sync::Arc;

const ALREADY_CLAIMED: &str = "You have already claimed this promotion";

#[derive(Clone)]
pub struct CouponService {
    pool: Arc<DatabaseConnection>,
}

impl CouponService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// Claims a coupon for an active promotion. A second claim for the same
    /// user and promotion hits the unique constraint and becomes `Conflict`.
    pub async fn issue(&self, request: IssueCouponRequest) -> AppResult<IssueCouponResponse> {
        let promotion: ActivePromotionRow = fetch_one(
            self.pool.as_ref(),
            queries::CHECK_ACTIVE_PROMOTION,
            vec![request.promotion_id.into(), today().into()],
        )
        .await?
        .ok_or_else(|| {
            AppError::BadRequest("Promotion is not active or does not exist".to_string())
        })?;

        let code = generate_coupon_code();

        execute(
            self.pool.as_ref(),
            queries::ADD_COUPON,
            vec![
                request.user_id.into(),
                promotion.id.into(),
                code.clone().into(),
            ],
        )
        .await
        .map_err(|e| {
            match AppError::unique_violation_as_conflict(e, ALREADY_CLAIMED) {
                AppError::DatabaseError(e) => {
                    AppError::foreign_key_violation_as_not_found(e, "User not found")
                }
                other => other,
            }
        })?;

        log::info!(
            "Issued coupon {code} to user_id={} for promotion {}",
            request.user_id,
            promotion.id
        );
        Ok(IssueCouponResponse { code })
    }

    /// Marks a coupon as used and returns its discount. The status flip only
    /// matches unused coupons, so concurrent redemptions succeed at most once.
    pub async fn redeem(&self, code: String) -> AppResult<RedeemCouponResponse> {
        let already_used = || AppError::BadRequest("Coupon already used".to_string());

        let txn = self.pool.begin().await?;

        let coupon: CouponRow = fetch_one(&txn, queries::CHECK_COUPON, vec![code.into()])
            .await?
            .ok_or_else(|| AppError::BadRequest("Invalid or expired coupon".to_string()))?;

        if coupon.status == CouponStatus::Used {
            return Err(already_used());
        }

        let updated = execute(&txn, queries::USE_COUPON, vec![coupon.coupon_id.into()]).await?;
        if updated == 0 {
            return Err(already_used());
        }

        txn.commit().await?;
        log::info!("Redeemed coupon {}", coupon.code);

        Ok(RedeemCouponResponse {
            discount_value: coupon.discount_value,
        })
    }
}
