use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::shared::series::{DataPoint, GapPolicy};

/// Нижняя граница оси Y для ряда
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisMin {
    /// По минимальному значению данных
    #[default]
    Auto,
    Zero,
}

impl AxisMin {
    pub fn as_bound(&self) -> Option<f64> {
        match self {
            AxisMin::Auto => None,
            AxisMin::Zero => Some(0.0),
        }
    }
}

impl std::str::FromStr for AxisMin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" | "min-value" | "" => Ok(AxisMin::Auto),
            "zero" | "zeroize" => Ok(AxisMin::Zero),
            other => Err(format!("Unknown axis minimum '{}'", other)),
        }
    }
}

/// Настройки одного ряда графика
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSettings {
    pub category_id: String,
    #[serde(default)]
    pub blanks: GapPolicy,
    #[serde(default)]
    pub axis_min: AxisMin,
}

/// Request for the date graph dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGraphRequest {
    /// Start date (inclusive); defaults to the configured range ending today
    pub start: Option<NaiveDate>,
    /// End date (inclusive); defaults to today
    pub end: Option<NaiveDate>,
    pub series: Vec<SeriesSettings>,
}

/// Query-string form: GET /api/d100/date-graph?start=..&end=..&categories=a,b&blanks=zeroize,skip
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateGraphQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub categories: Option<String>,
    pub blanks: Option<String>,
    pub axis_min: Option<String>,
}

impl DateGraphQuery {
    /// Преобразовать списки через запятую в запрос.
    ///
    /// Если политик меньше, чем категорий, недостающие берутся по умолчанию.
    pub fn into_request(self) -> Result<DateGraphRequest, String> {
        fn split(list: &Option<String>) -> Vec<&str> {
            list.as_deref()
                .map(|s| s.split(',').map(str::trim).filter(|p| !p.is_empty()).collect())
                .unwrap_or_default()
        }

        let categories = split(&self.categories);
        let blanks = split(&self.blanks);
        let axis_min = split(&self.axis_min);

        let series = categories
            .iter()
            .enumerate()
            .map(|(i, category_id)| {
                Ok(SeriesSettings {
                    category_id: category_id.to_string(),
                    blanks: blanks.get(i).map(|b| b.parse()).transpose()?.unwrap_or_default(),
                    axis_min: axis_min.get(i).map(|a| a.parse()).transpose()?.unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(DateGraphRequest {
            start: self.start,
            end: self.end,
            series,
        })
    }
}

/// Response for the date graph dashboard
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DateGraphResponse {
    /// Effective range after defaults were applied
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Unified axis, one label per day in format "YYYY-MM-DD"
    pub labels: Vec<String>,
    pub datasets: Vec<SeriesDataset>,
}

impl DateGraphResponse {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Single chart series aligned to the labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDataset {
    /// Category name
    pub label: String,
    pub category_id: String,
    /// "y1" for the first series, "y2" for the others
    pub axis_id: String,
    /// One value per label; None is a gap
    pub data: Vec<Option<f64>>,
    /// In-range points sorted by date (for tooltips)
    pub points: Vec<DataPoint>,
    pub axis_min: Option<f64>,
}

/// Live chart message (WebSocket /api/d100/date-graph/live)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveChartMessage {
    /// Request token the result was computed for
    pub token: u64,
    #[serde(flatten)]
    pub response: DateGraphResponse,
}

pub fn axis_id_for(index: usize) -> &'static str {
    if index == 0 {
        "y1"
    } else {
        "y2"
    }
}
