use crate::config::{ChartApiConfig, TextApiConfig};
use crate::error::{AppError, AppResult};
use crate::models::{BirthChartRequest, Element, ElementProfile, json_string_list};
use reqwest::Client;
use serde_json::{Value, json};
use std::future::Future;
use std::time::Duration;

const CHART_SCRIPT: &str = "zh";
const CHART_VIEW: &str = "full";
const MAX_TOKENS: u32 = 250;
const TEMPERATURE: f64 = 0.7;

pub const FALLBACK_PREDICTION: &str = "ขอโทษ ไม่สามารถให้คำทำนายได้ในขณะนี้";

const SYSTEM_PROMPT: &str =
    "คุณเป็นผู้ช่วยโหราศาสตร์ที่ให้คำทำนายสั้น กระชับ อ่านง่าย สำหรับแสดงบนแดชบอร์ด";

/// The two third-party calls the services depend on.
pub trait PredictionApi: Send + Sync {
    /// Computes the element profile for a birth chart.
    ///
    /// Transport failures, timeouts and non-2xx answers are
    /// `ServiceUnavailable`; a response without a usable summary is
    /// `BadGateway`.
    fn chart(
        &self,
        request: &BirthChartRequest,
    ) -> impl Future<Output = AppResult<ElementProfile>> + Send;

    /// Generates today's one-sentence prediction for an element.
    fn narrate(&self, element: Element) -> impl Future<Output = AppResult<String>> + Send;
}

#[derive(Clone)]
pub struct PredictionClient {
    http: Client,
    chart: ChartApiConfig,
    text: TextApiConfig,
}

impl PredictionClient {
    pub fn new(chart: ChartApiConfig, text: TextApiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("element-loyalty-backend")
            .build()?;
        Ok(Self { http, chart, text })
    }
}

impl PredictionApi for PredictionClient {
    async fn chart(&self, request: &BirthChartRequest) -> AppResult<ElementProfile> {
        let response = self
            .http
            .post(&self.chart.url)
            .header("X-API-Key", &self.chart.api_key)
            .timeout(Duration::from_secs(self.chart.timeout_secs))
            .json(&chart_body(request))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let body = match response {
            Ok(r) => r.text().await,
            Err(e) => Err(e),
        }
        .map_err(|e| {
            log::error!("Bazi API error: {e}");
            AppError::ServiceUnavailable("Bazi service unavailable".to_string())
        })?;

        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            log::error!("Bazi API returned non-JSON body: {e}");
            AppError::BadGateway("Invalid Bazi response".to_string())
        })?;

        parse_chart_summary(&payload)
    }

    async fn narrate(&self, element: Element) -> AppResult<String> {
        if self.text.api_key.is_empty() {
            return Err(AppError::ConfigError("AI service not configured".to_string()));
        }

        let response = self
            .http
            .post(&self.text.url)
            .bearer_auth(&self.text.api_key)
            .timeout(Duration::from_secs(self.text.timeout_secs))
            .json(&narrate_body(&self.text.model, element))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let body = match response {
            Ok(r) => r.text().await,
            Err(e) => Err(e),
        }
        .map_err(|e| {
            log::error!("Text generation API error: {e}");
            AppError::ServiceUnavailable("Prediction service unavailable".to_string())
        })?;

        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok(extract_completion_text(&payload))
    }
}

pub fn chart_body(request: &BirthChartRequest) -> Value {
    json!({
        "name": request.name,
        "bday": request.day,
        "bmonth": request.month,
        "byear": request.year,
        "b_hour": request.hour,
        "b_minute": request.minute,
        "bplace": request.place,
        "script": CHART_SCRIPT,
        "view": CHART_VIEW,
    })
}

/// Pulls the element profile out of a chart response.
pub fn parse_chart_summary(payload: &Value) -> AppResult<ElementProfile> {
    let summary = match payload.get("summary") {
        Some(s) if s.is_object() => s,
        _ => return Err(AppError::BadGateway("Invalid Bazi response".to_string())),
    };

    let main_element = summary
        .pointer("/dayMaster/elementTh")
        .and_then(Value::as_str)
        .and_then(Element::from_label)
        .ok_or_else(|| AppError::BadGateway("Invalid element data".to_string()))?;

    Ok(ElementProfile {
        main_element,
        favorable_elements: json_string_list(summary.get("favorableElements").cloned()),
        unfavorable_elements: json_string_list(summary.get("unfavorableElements").cloned()),
    })
}

pub fn build_prompt(element: Element) -> String {
    format!(
        "คุณเป็นผู้ช่วยโหราศาสตร์ที่เชี่ยวชาญด้านธาตุประจำตัวและสีมงคล\n\
         \n\
         ข้อมูลผู้ใช้:\n\
         - ธาตุประจำตัว: {element}\n\
         \n\
         ข้อกำหนดการตอบ:\n\
         - ตอบเป็นข้อความยาวเพียง 1 ประโยคต่อเนื่องเท่านั้น\n\
         - ห้ามขึ้นบรรทัดใหม่\n\
         - ห้ามใช้หัวข้อหรือสัญลักษณ์รายการ\n\
         - ใช้ภาษาไทยสุภาพ อ่านลื่น เหมาะกับหน้าแดชบอร์ด\n\
         - ความยาวไม่เกิน 3–4 บรรทัดบนหน้าจอ\n\
         \n\
         เนื้อหาที่ต้องมีครบในประโยคเดียว:\n\
         - ดัชนีโชคชะตารายวัน (ดี / ปานกลาง / ระวัง)\n\
         - สีมงคล 1–3 สี พร้อมเหตุผลสั้น ๆ ว่าเหมาะกับธาตุอย่างไร\n\
         - คำทำนายโดยสรุปด้านโชคชะตา การงาน การเงิน และความรัก\n",
        element = element.label()
    )
}

pub fn narrate_body(model: &str, element: Element) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": build_prompt(element) },
        ],
        "max_tokens": MAX_TOKENS,
        "temperature": TEMPERATURE,
    })
}

/// First completion's text, chat or legacy shape, else the fallback line.
pub fn extract_completion_text(payload: &Value) -> String {
    let first = payload.pointer("/choices/0");
    first
        .and_then(|c| c.pointer("/message/content"))
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            first
                .and_then(|c| c.get("text"))
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| FALLBACK_PREDICTION.to_string())
}
