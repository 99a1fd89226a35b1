use crate::models::*;
use crate::services::{IdentityService, MenuService, RestaurantService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/restaurant/login",
    tag = "restaurant",
    request_body = RestaurantLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = RestaurantSummary),
        (status = 401, description = "Invalid email or password", body = ApiErrorResponse)
    )
)]
pub async fn login(
    restaurant_service: web::Data<RestaurantService>,
    request: web::Json<RestaurantLoginRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(request) => restaurant_service.login(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Login successful",
            "user": user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/restaurant/edit",
    tag = "restaurant",
    request_body = EditRestaurantRequest,
    responses(
        (status = 200, description = "Restaurant updated"),
        (status = 400, description = "No data to update", body = ApiErrorResponse),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse),
        (status = 409, description = "Email already exists", body = ApiErrorResponse)
    )
)]
pub async fn edit_restaurant(
    restaurant_service: web::Data<RestaurantService>,
    request: web::Json<EditRestaurantRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok((restaurant_id, changes)) => restaurant_service.edit(restaurant_id, changes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Restaurant updated successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/restaurant/menu",
    tag = "menu",
    request_body = MenuListRequest,
    responses(
        (status = 200, description = "One page of the restaurant's menu", body = [MenuItemResponse])
    )
)]
pub async fn list_menu(
    menu_service: web::Data<MenuService>,
    request: web::Json<MenuListRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(request) => menu_service.list_menu(request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(menu) if menu.is_empty() => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "No menus found",
            "menu": menu
        }))),
        Ok(menu) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "menu": menu
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/restaurant/add/menu",
    tag = "menu",
    request_body = AddMenuRequest,
    responses(
        (status = 201, description = "Menu created"),
        (status = 404, description = "Restaurant not found", body = ApiErrorResponse)
    )
)]
pub async fn add_menu(
    menu_service: web::Data<MenuService>,
    request: web::Json<AddMenuRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(menu) => menu_service.add_menu(menu).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(menu_id) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Menu created successfully",
            "menu_id": menu_id
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/restaurant/edit/menu",
    tag = "menu",
    request_body = EditMenuRequest,
    responses(
        (status = 200, description = "Menu updated"),
        (status = 400, description = "No data to update", body = ApiErrorResponse),
        (status = 404, description = "Menu not found", body = ApiErrorResponse)
    )
)]
pub async fn edit_menu(
    menu_service: web::Data<MenuService>,
    request: web::Json<EditMenuRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok((menu_id, changes)) => menu_service.edit_menu(menu_id, changes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Menu updated successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/restaurant/promotion/create",
    tag = "promotion",
    request_body = CreatePromotionRequest,
    responses(
        (status = 201, description = "Promotion group created", body = CreatePromotionResponse),
        (status = 404, description = "No menus match the specified elements", body = ApiErrorResponse)
    )
)]
pub async fn create_promotion(
    menu_service: web::Data<MenuService>,
    request: web::Json<CreatePromotionRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(group) => menu_service.create_promotion_group(group).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(created) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Promotion created successfully",
            "promotion_group_id": created.promotion_group_id,
            "menu_count": created.menu_count
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/restaurant/promotionGroup/get/{group_id}",
    tag = "promotion",
    params(("group_id" = i64, Path, description = "Promotion group id")),
    responses(
        (status = 200, description = "Promotion group", body = PromotionGroupResponse),
        (status = 404, description = "Promotion group not found", body = ApiErrorResponse)
    )
)]
pub async fn get_promotion_group(
    menu_service: web::Data<MenuService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match menu_service.get_promotion_group(path.into_inner()).await {
        Ok(group) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": group
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/restaurant/promotionGroup/update",
    tag = "promotion",
    request_body = UpdatePromotionGroupRequest,
    responses(
        (status = 200, description = "Promotion group updated"),
        (status = 404, description = "Promotion group not found", body = ApiErrorResponse)
    )
)]
pub async fn update_promotion_group(
    menu_service: web::Data<MenuService>,
    request: web::Json<UpdatePromotionGroupRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok((group_id, changes)) => menu_service.update_promotion_group(group_id, changes).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Promotion group updated successfully"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/restaurant/promotionGroup/delete/{group_id}",
    tag = "promotion",
    params(("group_id" = i64, Path, description = "Promotion group id")),
    responses(
        (status = 200, description = "Promotion group deleted"),
        (status = 404, description = "Promotion group not found", body = ApiErrorResponse)
    )
)]
pub async fn delete_promotion_group(
    menu_service: web::Data<MenuService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match menu_service.delete_promotion_group(path.into_inner()).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Promotion group deleted successfully",
            "deleted": deleted
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/restaurant/restaurantUser",
    tag = "restaurant",
    request_body = RestaurantIdRequest,
    responses(
        (status = 200, description = "Users with their element distribution", body = RestaurantUsersResponse),
        (status = 404, description = "No users found in restaurant", body = ApiErrorResponse)
    )
)]
pub async fn restaurant_users(
    identity_service: web::Data<IdentityService>,
    request: web::Json<RestaurantIdRequest>,
) -> Result<HttpResponse> {
    let result = match request.into_inner().validate() {
        Ok(restaurant_id) => identity_service.list_restaurant_users(restaurant_id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(listing) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "element": listing.element,
            "user": listing.user
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn restaurant_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/restaurant")
            .route("/login", web::post().to(login))
            .route("/edit", web::post().to(edit_restaurant))
            .route("/menu", web::post().to(list_menu))
            .route("/add/menu", web::post().to(add_menu))
            .route("/edit/menu", web::post().to(edit_menu))
            .route("/promotion/create", web::post().to(create_promotion))
            .route(
                "/promotionGroup/get/{group_id}",
                web::get().to(get_promotion_group),
            )
            .route(
                "/promotionGroup/update",
                web::put().to(update_promotion_group),
            )
            .route(
                "/promotionGroup/delete/{group_id}",
                web::delete().to(delete_promotion_group),
            )
            .route("/restaurantUser", web::post().to(restaurant_users)),
    );
}
