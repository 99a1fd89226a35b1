//! Mock rows and a scripted predictor shared by the service tests.

use crate::error::{AppError, AppResult};
use crate::external::PredictionApi;
use crate::models::{BirthChartRequest, Element, ElementProfile};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{DatabaseConnection, DbErr, MockExecResult, RuntimeErr, SqlxError, Value};
use serde_json::json;
use sqlx::error::{DatabaseError, ErrorKind};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

pub type Row = BTreeMap<&'static str, Value>;

/// Statements the mock saw, grouped per transaction, in `Debug` form.
/// Every service holding the pool must be dropped first.
pub fn transaction_log(pool: Arc<DatabaseConnection>) -> String {
    let pool = Arc::try_unwrap(pool)
        .ok()
        .expect("pool still shared by a service");
    format!("{:?}", pool.into_transaction_log())
}

/// A Postgres error as the driver reports it, keyed by SQLSTATE.
#[derive(Debug)]
struct PgError {
    code: &'static str,
    message: &'static str,
}

impl fmt::Display for PgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl StdError for PgError {}

impl DatabaseError for PgError {
    fn message(&self) -> &str {
        self.message
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.code))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        match self.code {
            "23505" => ErrorKind::UniqueViolation,
            "23503" => ErrorKind::ForeignKeyViolation,
            "23514" => ErrorKind::CheckViolation,
            _ => ErrorKind::Other,
        }
    }
}

fn pg_error(code: &'static str, message: &'static str) -> DbErr {
    DbErr::Exec(RuntimeErr::SqlxError(SqlxError::Database(Box::new(
        PgError { code, message },
    ))))
}

pub fn unique_violation() -> DbErr {
    pg_error("23505", "duplicate key value violates unique constraint")
}

pub fn foreign_key_violation() -> DbErr {
    pg_error("23503", "insert or update violates foreign key constraint")
}

pub fn check_violation() -> DbErr {
    pg_error("23514", "new row violates check constraint")
}

pub fn empty_rows() -> Vec<Row> {
    Vec::new()
}

pub fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

pub fn id_row(id: i64) -> Row {
    BTreeMap::from([("id", id.into())])
}

pub fn restaurant_row(id: i64) -> Row {
    BTreeMap::from([
        ("id", id.into()),
        ("name", "Baan Thai".into()),
        ("email", "owner@example.com".into()),
    ])
}

pub fn restaurant_credentials_row(id: i64, email: &str, password_hash: &str) -> Row {
    BTreeMap::from([
        ("id", id.into()),
        ("name", "Baan Thai".into()),
        ("email", email.into()),
        ("password", password_hash.into()),
    ])
}

fn element_value(main: Option<&str>) -> Value {
    Value::String(main.map(|m| Box::new(m.to_string())))
}

/// Row shape of the line-uid lookup, born 1990-05-20 14:30 in Bangkok.
pub fn user_row(id: i64, line_uid: &str, main: Option<&str>) -> Row {
    BTreeMap::from([
        ("id", id.into()),
        ("line_uid", line_uid.into()),
        ("name", "Somchai".into()),
        ("gender", "male".into()),
        ("phone", "0812345678".into()),
        ("birth_date", NaiveDate::from_ymd_opt(1990, 5, 20).unwrap().into()),
        ("birth_time", NaiveTime::from_hms_opt(14, 30, 0).unwrap().into()),
        ("birth_place", "Bangkok".into()),
        ("restaurant_id", 1i64.into()),
        ("main_element", element_value(main)),
        ("favorable_elements", json!(["ไม้"]).into()),
        ("unfavorable_elements", json!(["น้ำ"]).into()),
    ])
}

pub fn user_by_id_row(id: i64, main: Option<&str>) -> Row {
    BTreeMap::from([
        ("id", id.into()),
        ("restaurant_id", 1i64.into()),
        ("main_element", element_value(main)),
    ])
}

pub fn restaurant_user_row(id: i64, name: &str, main: Option<&str>) -> Row {
    BTreeMap::from([
        ("id", id.into()),
        ("name", name.into()),
        ("line_uid", format!("U{id}").into()),
        ("phone", "0812345678".into()),
        ("gender", "female".into()),
        ("created_at", Value::ChronoDateTimeUtc(None)),
        ("main_element", element_value(main)),
        ("favorable_elements", json!(["ดิน"]).into()),
    ])
}

pub fn element_count_row(label: &str, count: i64) -> Row {
    BTreeMap::from([("main_element", label.into()), ("count", count.into())])
}

pub fn prediction_row(text: &str) -> Row {
    BTreeMap::from([("prediction_text", text.into())])
}

pub fn menu_row(id: i64, name: &str, elements: &[&str]) -> Row {
    BTreeMap::from([
        ("id", id.into()),
        ("name", name.into()),
        ("price", 80.0f64.into()),
        ("element", json!(elements).into()),
        ("image_url", Value::String(None)),
        ("status", "AVAILABLE".into()),
        ("created_at", Value::ChronoDateTimeUtc(None)),
    ])
}

pub fn next_group_row(next_group: i64) -> Row {
    BTreeMap::from([("next_group", next_group.into())])
}

pub fn promotion_group_row(group_id: i64, menu_ids: &str, menu_count: i64) -> Row {
    BTreeMap::from([
        ("promotion_group_id", group_id.into()),
        ("menu_ids", menu_ids.into()),
        ("description", Value::String(None)),
        ("discount_value", 20.0f64.into()),
        ("start_date", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().into()),
        ("end_date", NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().into()),
        ("status", "AVAILABLE".into()),
        ("menu_count", menu_count.into()),
    ])
}

pub fn active_promotion_row(id: i64, discount_value: f64) -> Row {
    BTreeMap::from([
        ("id", id.into()),
        ("discount_value", discount_value.into()),
    ])
}

pub fn coupon_row(id: i64, code: &str, status: &str, discount_value: f64) -> Row {
    BTreeMap::from([
        ("coupon_id", id.into()),
        ("status", status.into()),
        ("code", code.into()),
        ("discount_value", discount_value.into()),
    ])
}

#[derive(Debug, Clone, Copy)]
pub enum ChartOutcome {
    Element(Element),
    Unavailable,
    InvalidResponse,
}

/// Scripted [`PredictionApi`] that counts its calls.
pub struct StubPredictor {
    chart: ChartOutcome,
    narration: Option<String>,
    chart_calls: AtomicUsize,
    narrate_calls: AtomicUsize,
    last_chart: Mutex<Option<BirthChartRequest>>,
}

impl StubPredictor {
    fn new(chart: ChartOutcome, narration: Option<&str>) -> Self {
        Self {
            chart,
            narration: narration.map(str::to_string),
            chart_calls: AtomicUsize::new(0),
            narrate_calls: AtomicUsize::new(0),
            last_chart: Mutex::new(None),
        }
    }

    pub fn narrating(text: &str) -> Self {
        Self::new(ChartOutcome::Element(Element::Fire), Some(text))
    }

    pub fn failing_narrate() -> Self {
        Self::new(ChartOutcome::Element(Element::Fire), None)
    }

    pub fn charting(element: Element) -> Self {
        Self::new(ChartOutcome::Element(element), Some("ดวงดี"))
    }

    pub fn charting_then_failing_narrate(element: Element) -> Self {
        Self::new(ChartOutcome::Element(element), None)
    }

    pub fn chart_failing(outcome: ChartOutcome) -> Self {
        Self::new(outcome, Some("ดวงดี"))
    }

    pub fn chart_calls(&self) -> usize {
        self.chart_calls.load(Ordering::SeqCst)
    }

    pub fn narrate_calls(&self) -> usize {
        self.narrate_calls.load(Ordering::SeqCst)
    }

    pub fn last_chart(&self) -> Option<BirthChartRequest> {
        self.last_chart.lock().unwrap().clone()
    }
}

impl PredictionApi for StubPredictor {
    async fn chart(&self, request: &BirthChartRequest) -> AppResult<ElementProfile> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_chart.lock().unwrap() = Some(request.clone());
        match self.chart {
            ChartOutcome::Element(main_element) => Ok(ElementProfile {
                main_element,
                favorable_elements: vec!["ไม้".to_string()],
                unfavorable_elements: vec!["น้ำ".to_string()],
            }),
            ChartOutcome::Unavailable => Err(AppError::ServiceUnavailable(
                "Bazi service unavailable".to_string(),
            )),
            ChartOutcome::InvalidResponse => {
                Err(AppError::BadGateway("Invalid Bazi response".to_string()))
            }
        }
    }

    async fn narrate(&self, _element: Element) -> AppResult<String> {
        self.narrate_calls.fetch_add(1, Ordering::SeqCst);
        self.narration.clone().ok_or_else(|| {
            AppError::ServiceUnavailable("Prediction service unavailable".to_string())
        })
    }
}
