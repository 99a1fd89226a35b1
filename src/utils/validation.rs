use crate::error::{AppError, AppResult};
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9,15}$").expect("phone regex"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-1][0-9]|2[0-3]):[0-5][0-9]$").expect("time regex"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex")
});
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url regex"));

fn invalid(field: &str, reason: &str) -> AppError {
    AppError::ValidationError(format!("{field}: {reason}"))
}

/// Trims `value` and checks its length in characters.
pub fn require_text(field: &str, value: &str, min: usize, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(invalid(field, "is required"));
    }
    if len < min || len > max {
        return Err(invalid(
            field,
            &format!("length must be between {min} and {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

pub fn optional_text(
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) -> AppResult<Option<String>> {
    value.map(|v| require_text(field, v, min, max)).transpose()
}

pub fn require_positive_id(field: &str, value: i64) -> AppResult<i64> {
    if value < 1 {
        return Err(invalid(field, "must be a positive integer"));
    }
    Ok(value)
}

pub fn validate_phone(phone: &str) -> AppResult<String> {
    let phone = phone.trim();
    if !PHONE_RE.is_match(phone) {
        return Err(invalid("phone", "must be 9 to 15 digits"));
    }
    Ok(phone.to_string())
}

/// Parses a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    let value = value.trim();
    if !DATE_RE.is_match(value) {
        return Err(invalid(field, "must be formatted YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid(field, "is not a valid date"))
}

/// Parses a 24-hour `HH:MM` time.
pub fn parse_time(field: &str, value: &str) -> AppResult<NaiveTime> {
    let value = value.trim();
    if !TIME_RE.is_match(value) {
        return Err(invalid(field, "must be formatted HH:MM"));
    }
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| invalid(field, "is not a valid time"))
}

pub fn validate_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(invalid("email", "must be a valid email address"));
    }
    Ok(email)
}

pub fn validate_url(field: &str, url: &str) -> AppResult<String> {
    let url = url.trim();
    if !URL_RE.is_match(url) {
        return Err(invalid(field, "must be a valid URL"));
    }
    Ok(url.to_string())
}

pub fn validate_range(field: &str, value: f64, min: f64, max: f64) -> AppResult<f64> {
    if !value.is_finite() || value < min || value > max {
        return Err(invalid(field, &format!("must be between {min} and {max}")));
    }
    Ok(value)
}
