use super::{Element, Gender};
use crate::error::AppResult;
use crate::utils::{
    optional_text, parse_date, parse_time, require_positive_id, require_text, validate_phone,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use sea_orm::FromQueryResult;
use sea_orm::prelude::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct LineUidCheckRequest {
    #[serde(rename = "lineUid")]
    #[schema(example = "U4af4980629")]
    pub line_uid: String,
    #[serde(rename = "restaurantId")]
    #[schema(example = 1)]
    pub restaurant_id: i64,
}

impl LineUidCheckRequest {
    pub fn validate(self) -> AppResult<Self> {
        Ok(Self {
            line_uid: require_text("lineUid", &self.line_uid, 1, 100)?,
            restaurant_id: require_positive_id("restaurantId", self.restaurant_id)?,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(rename = "lineUid")]
    #[schema(example = "U1")]
    pub line_uid: String,
    #[schema(example = "Somchai")]
    pub name: String,
    #[schema(example = "male")]
    pub gender: String,
    #[schema(example = "0812345678")]
    pub phone: String,
    #[schema(example = "1990-05-20")]
    pub birth_date: String,
    #[schema(example = "14:30")]
    pub birth_time: String,
    #[schema(example = "Bangkok")]
    pub birth_place: String,
    #[serde(rename = "restaurantId")]
    #[schema(example = 1)]
    pub restaurant_id: i64,
}

impl RegisterRequest {
    pub fn validate(self) -> AppResult<NewUser> {
        Ok(NewUser {
            line_uid: require_text("lineUid", &self.line_uid, 1, 100)?,
            restaurant_id: require_positive_id("restaurantId", self.restaurant_id)?,
            name: require_text("name", &self.name, 2, 100)?,
            gender: parse_gender(&self.gender)?,
            phone: validate_phone(&self.phone)?,
            birth: BirthData {
                date: parse_date("birth_date", &self.birth_date)?,
                time: parse_time("birth_time", &self.birth_time)?,
                place: require_text("birth_place", &self.birth_place, 1, 200)?,
            },
        })
    }
}

/// Partial profile update. Absent or blank fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditProfileRequest {
    #[serde(rename = "lineUid")]
    pub line_uid: String,
    #[serde(rename = "restaurantId")]
    pub restaurant_id: i64,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub birth_time: Option<String>,
    pub birth_place: Option<String>,
}

impl EditProfileRequest {
    pub fn validate(self) -> AppResult<ProfileEdit> {
        let changes = ProfileChanges {
            name: optional_text("name", non_blank(&self.name), 2, 100)?,
            gender: non_blank(&self.gender).map(parse_gender).transpose()?,
            phone: non_blank(&self.phone).map(validate_phone).transpose()?,
            birth_date: non_blank(&self.birth_date)
                .map(|v| parse_date("birth_date", v))
                .transpose()?,
            birth_time: non_blank(&self.birth_time)
                .map(|v| parse_time("birth_time", v))
                .transpose()?,
            birth_place: optional_text("birth_place", non_blank(&self.birth_place), 1, 200)?,
        };

        Ok(ProfileEdit {
            line_uid: require_text("lineUid", &self.line_uid, 1, 100)?,
            restaurant_id: require_positive_id("restaurantId", self.restaurant_id)?,
            changes,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserIdRequest {
    #[schema(example = 1)]
    pub user_id: i64,
}

impl UserIdRequest {
    pub fn validate(self) -> AppResult<i64> {
        require_positive_id("user_id", self.user_id)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_gender(value: &str) -> AppResult<Gender> {
    value.trim().parse().map_err(|_| {
        crate::error::AppError::ValidationError(
            "gender: must be one of male, female, other".to_string(),
        )
    })
}

// ---------------------------------------------------------------------------
// Domain values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthData {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub place: String,
}

impl BirthData {
    pub fn chart_request(&self, name: &str) -> BirthChartRequest {
        BirthChartRequest {
            name: name.to_string(),
            day: self.date.day(),
            month: self.date.month(),
            year: self.date.year(),
            hour: self.time.hour(),
            minute: self.time.minute(),
            place: self.place.clone(),
        }
    }
}

/// Input of the chart service call, already split into calendar parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthChartRequest {
    pub name: String,
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
    pub place: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub line_uid: String,
    pub restaurant_id: i64,
    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub birth: BirthData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_time: Option<NaiveTime>,
    pub birth_place: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.gender.is_none()
            && self.phone.is_none()
            && self.birth_date.is_none()
            && self.birth_time.is_none()
            && self.birth_place.is_none()
    }

    /// True when any supplied birth field differs from the stored one.
    pub fn birth_changed(&self, stored: &BirthData) -> bool {
        self.birth_date.is_some_and(|d| d != stored.date)
            || self.birth_time.is_some_and(|t| t != stored.time)
            || self
                .birth_place
                .as_deref()
                .is_some_and(|p| p != stored.place)
    }

    pub fn merged_birth(&self, stored: &BirthData) -> BirthData {
        BirthData {
            date: self.birth_date.unwrap_or(stored.date),
            time: self.birth_time.unwrap_or(stored.time),
            place: self
                .birth_place
                .clone()
                .unwrap_or_else(|| stored.place.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileEdit {
    pub line_uid: String,
    pub restaurant_id: i64,
    pub changes: ProfileChanges,
}

/// Element profile as extracted from the chart service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ElementProfile {
    pub main_element: Element,
    pub favorable_elements: Vec<String>,
    pub unfavorable_elements: Vec<String>,
}

/// Reads a JSON array column into its string members.
pub fn json_string_list(value: Option<Json>) -> Vec<String> {
    match value {
        Some(Json::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn string_list_json(items: &[String]) -> Json {
    Json::Array(items.iter().cloned().map(Json::String).collect())
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromQueryResult)]
pub struct UserRecord {
    pub id: i64,
    pub line_uid: String,
    pub name: String,
    pub gender: Gender,
    pub phone: String,
    pub birth_date: NaiveDate,
    pub birth_time: NaiveTime,
    pub birth_place: String,
    pub restaurant_id: i64,
    pub main_element: Option<String>,
    pub favorable_elements: Option<Json>,
    pub unfavorable_elements: Option<Json>,
}

impl UserRecord {
    pub fn birth(&self) -> BirthData {
        BirthData {
            date: self.birth_date,
            time: self.birth_time,
            place: self.birth_place.clone(),
        }
    }

    /// `None` when the user has no element row or the stored label is not
    /// one of the five elements.
    pub fn element_profile(&self) -> Option<ElementProfile> {
        let main_element = Element::from_label(self.main_element.as_deref()?)?;
        Some(ElementProfile {
            main_element,
            favorable_elements: json_string_list(self.favorable_elements.clone()),
            unfavorable_elements: json_string_list(self.unfavorable_elements.clone()),
        })
    }
}

/// User looked up by id together with the stored main element label.
#[derive(Debug, Clone, FromQueryResult)]
pub struct UserElementRecord {
    pub id: i64,
    pub restaurant_id: i64,
    pub main_element: Option<String>,
}

impl UserElementRecord {
    pub fn element(&self) -> Option<Element> {
        self.main_element.as_deref().and_then(Element::from_label)
    }
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct RestaurantUserRow {
    pub id: i64,
    pub name: String,
    pub line_uid: String,
    pub phone: String,
    pub gender: Gender,
    pub created_at: Option<DateTime<Utc>>,
    pub main_element: Option<String>,
    pub favorable_elements: Option<Json>,
}

#[derive(Debug, Clone, Serialize, FromQueryResult, ToSchema)]
pub struct ElementCount {
    pub main_element: String,
    pub count: i64,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: i64,
    pub line_uid: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginProfile {
    pub user: UserSummary,
    pub bazi: Option<ElementProfile>,
}

#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(LoginProfile),
    NeedsRegistration,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserSummary,
    pub bazi: ElementProfile,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EditProfileResponse {
    pub bazi_recalculated: bool,
    pub bazi: Option<ElementProfile>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RestaurantUserResponse {
    pub id: i64,
    pub name: String,
    pub line_uid: String,
    pub phone: String,
    pub gender: Gender,
    pub created_at: Option<DateTime<Utc>>,
    pub main_element: Option<Element>,
    pub favorable_elements: Vec<String>,
}

impl From<RestaurantUserRow> for RestaurantUserResponse {
    fn from(row: RestaurantUserRow) -> Self {
        Self {
            main_element: row.main_element.as_deref().and_then(Element::from_label),
            favorable_elements: json_string_list(row.favorable_elements),
            id: row.id,
            name: row.name,
            line_uid: row.line_uid,
            phone: row.phone,
            gender: row.gender,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RestaurantUsersResponse {
    pub element: Vec<ElementCount>,
    pub user: Vec<RestaurantUserResponse>,
}
