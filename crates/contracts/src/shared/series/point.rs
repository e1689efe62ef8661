use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::value::{parse_value_to_display, parse_value_to_number, ValueKind};

/// Точка ряда, производная от записи (не хранится)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    #[serde(rename = "displayValue")]
    pub display_value: String,
    /// None, если значение не распознано
    #[serde(rename = "numericValue")]
    pub numeric_value: Option<f64>,
    pub note: String,
}

impl DataPoint {
    pub fn from_raw(date: NaiveDate, raw: &str, note: &str, kind: ValueKind) -> Self {
        Self {
            date,
            display_value: parse_value_to_display(raw, kind),
            numeric_value: parse_value_to_number(raw, kind),
            note: note.to_string(),
        }
    }
}
