use sea_orm::{DeriveActiveEnum, EnumIter, Iterable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Five-element classification derived from a birth chart.
///
/// Stored, serialised and sent to the text-generation prompt as its Thai
/// label, which is also what the chart service returns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Element {
    #[sea_orm(string_value = "ดิน")]
    #[serde(rename = "ดิน")]
    Earth,
    #[sea_orm(string_value = "น้ำ")]
    #[serde(rename = "น้ำ")]
    Water,
    #[sea_orm(string_value = "ไฟ")]
    #[serde(rename = "ไฟ")]
    Fire,
    #[sea_orm(string_value = "ทอง")]
    #[serde(rename = "ทอง")]
    Metal,
    #[sea_orm(string_value = "ไม้")]
    #[serde(rename = "ไม้")]
    Wood,
}

impl Element {
    pub fn label(&self) -> &'static str {
        match self {
            Element::Earth => "ดิน",
            Element::Water => "น้ำ",
            Element::Fire => "ไฟ",
            Element::Metal => "ทอง",
            Element::Wood => "ไม้",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Element::iter().find(|e| e.label() == label)
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
