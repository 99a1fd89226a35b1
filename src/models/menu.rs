use super::{Element, MenuStatus};
use crate::error::{AppError, AppResult};
use crate::utils::{optional_text, require_positive_id, require_text, validate_range, validate_url};
use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use sea_orm::prelude::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MENU_PAGE_SIZE: i64 = 10;
pub const MAX_MENU_PAGE: i64 = 10_000;

#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuListRequest {
    pub restaurant_id: i64,
    #[schema(example = 1)]
    pub page: i64,
}

impl MenuListRequest {
    pub fn validate(self) -> AppResult<Self> {
        let page = require_positive_id("page", self.page)?;
        if page > MAX_MENU_PAGE {
            return Err(AppError::ValidationError(format!(
                "page must not exceed {MAX_MENU_PAGE}"
            )));
        }
        Ok(Self {
            restaurant_id: require_positive_id("restaurant_id", self.restaurant_id)?,
            page,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * MENU_PAGE_SIZE
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMenuRequest {
    pub restaurant_id: i64,
    #[schema(example = "Tom Yum Goong")]
    pub name: String,
    #[schema(example = 120.0)]
    pub price: f64,
    pub element: Option<Vec<Element>>,
    pub image_url: Option<String>,
    pub status: Option<MenuStatus>,
}

impl AddMenuRequest {
    pub fn validate(self) -> AppResult<NewMenu> {
        Ok(NewMenu {
            restaurant_id: require_positive_id("restaurant_id", self.restaurant_id)?,
            name: require_text("name", &self.name, 2, 200)?,
            price: validate_range("price", self.price, 0.0, f64::MAX)?,
            element: self.element,
            image_url: self
                .image_url
                .as_deref()
                .map(|u| validate_url("image_url", u))
                .transpose()?,
            status: self.status.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub restaurant_id: i64,
    pub name: String,
    pub price: f64,
    pub element: Option<Vec<Element>>,
    pub image_url: Option<String>,
    pub status: MenuStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditMenuRequest {
    pub menuid: i64,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub element: Option<Vec<Element>>,
    pub image_url: Option<String>,
    pub status: Option<MenuStatus>,
}

impl EditMenuRequest {
    pub fn validate(self) -> AppResult<(i64, MenuChanges)> {
        let menu_id = require_positive_id("menuid", self.menuid)?;
        let changes = MenuChanges {
            name: optional_text("name", self.name.as_deref(), 2, 200)?,
            price: self
                .price
                .map(|p| validate_range("price", p, 0.0, f64::MAX))
                .transpose()?,
            element: self.element,
            image_url: self
                .image_url
                .as_deref()
                .map(|u| validate_url("image_url", u))
                .transpose()?,
            status: self.status,
        };
        if changes.is_empty() {
            return Err(AppError::BadRequest("No data to update".to_string()));
        }
        Ok((menu_id, changes))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub element: Option<Vec<Element>>,
    pub image_url: Option<String>,
    pub status: Option<MenuStatus>,
}

impl MenuChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.element.is_none()
            && self.image_url.is_none()
            && self.status.is_none()
    }
}

/// Encodes an element list as the JSONB array stored in `menu.element`.
pub fn elements_json(elements: &[Element]) -> Json {
    Json::Array(
        elements
            .iter()
            .map(|e| Json::String(e.label().to_string()))
            .collect(),
    )
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct MenuRow {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub element: Option<Json>,
    pub image_url: Option<String>,
    pub status: MenuStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub element: Vec<Element>,
    pub image_url: Option<String>,
    pub status: MenuStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<MenuRow> for MenuItemResponse {
    type Error = AppError;

    fn try_from(row: MenuRow) -> AppResult<Self> {
        let element = match row.element {
            Some(Json::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value)?,
        };
        Ok(Self {
            id: row.id,
            name: row.name,
            price: row.price,
            element,
            image_url: row.image_url,
            status: row.status,
            created_at: row.created_at,
        })
    }
}
