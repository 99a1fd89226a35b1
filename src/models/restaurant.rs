use crate::error::{AppError, AppResult};
use crate::utils::{optional_text, require_positive_id, validate_email};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestaurantLoginRequest {
    #[schema(example = "owner@example.com")]
    pub email: String,
    pub password: String,
}

impl RestaurantLoginRequest {
    pub fn validate(self) -> AppResult<Self> {
        if self.password.len() < 6 {
            return Err(AppError::ValidationError(
                "password: must be at least 6 characters".to_string(),
            ));
        }
        Ok(Self {
            email: validate_email(&self.email)?,
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditRestaurantRequest {
    pub restaurant_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl EditRestaurantRequest {
    pub fn validate(self) -> AppResult<(i64, RestaurantChanges)> {
        let restaurant_id = require_positive_id("restaurant_id", self.restaurant_id)?;
        if let Some(password) = &self.password
            && password.len() < 8
        {
            return Err(AppError::ValidationError(
                "password: must be at least 8 characters".to_string(),
            ));
        }
        let changes = RestaurantChanges {
            name: optional_text("name", self.name.as_deref(), 2, 200)?,
            email: self.email.as_deref().map(validate_email).transpose()?,
            password: self.password,
        };
        if changes.is_empty() {
            return Err(AppError::BadRequest("No data to update".to_string()));
        }
        Ok((restaurant_id, changes))
    }
}

/// Plain-text password here; the service hashes it before storage.
#[derive(Debug, Clone, Default)]
pub struct RestaurantChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RestaurantChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestaurantIdRequest {
    pub restaurant_id: i64,
}

impl RestaurantIdRequest {
    pub fn validate(self) -> AppResult<i64> {
        require_positive_id("restaurant_id", self.restaurant_id)
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct RestaurantRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct RestaurantCredentialRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RestaurantSummary {
    pub restaurant_id: i64,
    pub name: String,
    pub email: String,
}
