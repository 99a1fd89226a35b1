use crate::models::*;
use crate::services::{CouponService, IdentityService, MenuService, PredictionService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/auth/lineUIDCheck",
    tag = "auth",
    request_body = LineUidCheckRequest,
    responses(
        (status = 200, description = "User found, profile returned", body = LoginProfile),
        (status = 404, description = "Restaurant not found, or user must register"),
        (status = 400, description = "Invalid request", body = ApiErrorResponse)
    )
)]
pub async fn line_uid_check(
    identity_service: web::Data<IdentityService>,
    request: web::Json<LineUidCheckRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(request) => identity_service.lookup(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(LookupOutcome::Found(profile)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "action": "LOGIN",
            "user": profile.user,
            "bazi": profile.bazi
        }))),
        Ok(LookupOutcome::NeedsRegistration) => Ok(HttpResponse::NotFound().json(json!({
            "success": false,
            "action": "Register"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid request", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 409, description = "User already registered", body = ApiErrorResponse),
        (status = 502, description = "Chart service returned invalid data", body = ApiErrorResponse),
        (status = 503, description = "Chart service unavailable", body = ApiErrorResponse)
    )
)]
pub async fn register(
    identity_service: web::Data<IdentityService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(new_user) => identity_service.register(new_user).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "action": "LOGIN",
            "user": response.user,
            "bazi": response.bazi
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/auth/editProfile",
    tag = "auth",
    request_body = EditProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = EditProfileResponse),
        (status = 400, description = "Invalid request", body = ApiErrorResponse),
        (status = 404, description = "Restaurant or user not found", body = ApiErrorResponse),
        (status = 502, description = "Chart service returned invalid data", body = ApiErrorResponse),
        (status = 503, description = "Chart service unavailable", body = ApiErrorResponse)
    )
)]
pub async fn edit_profile(
    identity_service: web::Data<IdentityService>,
    request: web::Json<EditProfileRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(edit) => identity_service.edit_profile(edit).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Profile updated",
            "bazi_recalculated": response.bazi_recalculated,
            "bazi": response.bazi
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/prediction",
    tag = "auth",
    request_body = UserIdRequest,
    responses(
        (status = 200, description = "Today's prediction", body = PredictionResponse),
        (status = 400, description = "Invalid request or element data", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse),
        (status = 503, description = "Prediction service unavailable", body = ApiErrorResponse)
    )
)]
pub async fn prediction(
    prediction_service: web::Data<PredictionService>,
    request: web::Json<UserIdRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(user_id) => prediction_service.get_or_create(user_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(message) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": message
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/findmenu",
    tag = "auth",
    request_body = UserIdRequest,
    responses(
        (status = 200, description = "Menus matching the user's element", body = [MenuItemResponse]),
        (status = 404, description = "User not found", body = ApiErrorResponse)
    )
)]
pub async fn find_menu(
    menu_service: web::Data<MenuService>,
    request: web::Json<UserIdRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(user_id) => menu_service.list_available_menu_for_user(user_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(menu) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "menu": menu
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/coupon/add",
    tag = "coupon",
    request_body = IssueCouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = IssueCouponResponse),
        (status = 400, description = "Promotion is not active or does not exist", body = ApiErrorResponse),
        (status = 409, description = "Promotion already claimed", body = ApiErrorResponse)
    )
)]
pub async fn add_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<IssueCouponRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(request) => coupon_service.issue(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Coupon created",
            "code": response.code
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/coupon/use",
    tag = "coupon",
    request_body = RedeemCouponRequest,
    responses(
        (status = 200, description = "Coupon applied", body = RedeemCouponResponse),
        (status = 400, description = "Invalid, expired or already used coupon", body = ApiErrorResponse)
    )
)]
pub async fn use_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<RedeemCouponRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(code) => coupon_service.redeem(code).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Coupon applied successfully",
            "discount_value": response.discount_value
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/lineUIDCheck", web::post().to(line_uid_check))
            .route("/register", web::post().to(register))
            .route("/editProfile", web::put().to(edit_profile))
            .route("/prediction", web::post().to(prediction))
            .route("/findmenu", web::post().to(find_menu))
            .route("/coupon/add", web::post().to(add_coupon))
            .route("/coupon/use", web::post().to(use_coupon)),
    );
}
