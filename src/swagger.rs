use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::index,
        handlers::health::health,
        handlers::auth::line_uid_check,
        handlers::auth::register,
        handlers::auth::edit_profile,
        handlers::auth::prediction,
        handlers::auth::find_menu,
        handlers::auth::add_coupon,
        handlers::auth::use_coupon,
        handlers::restaurant::login,
        handlers::restaurant::edit_restaurant,
        handlers::restaurant::list_menu,
        handlers::restaurant::add_menu,
        handlers::restaurant::edit_menu,
        handlers::restaurant::create_promotion,
        handlers::restaurant::get_promotion_group,
        handlers::restaurant::update_promotion_group,
        handlers::restaurant::delete_promotion_group,
        handlers::restaurant::restaurant_users,
    ),
    components(
        schemas(
            Element,
            Gender,
            MenuStatus,
            PromotionStatus,
            CouponStatus,
            ElementProfile,
            LineUidCheckRequest,
            RegisterRequest,
            EditProfileRequest,
            UserIdRequest,
            UserSummary,
            LoginProfile,
            RegisterResponse,
            EditProfileResponse,
            PredictionResponse,
            MenuListRequest,
            AddMenuRequest,
            EditMenuRequest,
            MenuItemResponse,
            CreatePromotionRequest,
            CreatePromotionResponse,
            UpdatePromotionGroupRequest,
            PromotionGroupResponse,
            IssueCouponRequest,
            IssueCouponResponse,
            RedeemCouponRequest,
            RedeemCouponResponse,
            RestaurantLoginRequest,
            EditRestaurantRequest,
            RestaurantIdRequest,
            RestaurantSummary,
            ElementCount,
            RestaurantUserResponse,
            RestaurantUsersResponse,
            ApiErrorResponse,
            ApiError,
        )
    ),
    tags(
        (name = "health", description = "Liveness and database health"),
        (name = "auth", description = "LINE identity, profile and daily prediction"),
        (name = "coupon", description = "Coupon issue and redemption"),
        (name = "restaurant", description = "Restaurant account and members"),
        (name = "menu", description = "Menu management"),
        (name = "promotion", description = "Element promotion groups"),
    ),
    info(
        title = "Element Loyalty Backend API",
        version = "1.0.0",
        description = "Restaurant loyalty REST API driven by birth-chart elements"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
