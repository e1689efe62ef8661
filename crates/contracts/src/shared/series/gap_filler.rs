use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::point::DataPoint;

/// Как заполнять даты оси, для которых у ряда нет наблюдения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPolicy {
    /// Оставить пропуск (пропуск не равен нулю)
    #[default]
    Skip,
    Zeroize,
    /// Перенести ближайшее предыдущее значение, 0 если его нет
    Previous,
    /// Значение по умолчанию категории, 0 если его нет
    Default,
}

impl GapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapPolicy::Skip => "skip",
            GapPolicy::Zeroize => "zeroize",
            GapPolicy::Previous => "previous",
            GapPolicy::Default => "default",
        }
    }
}

impl std::str::FromStr for GapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "skip" | "" => Ok(GapPolicy::Skip),
            "zeroize" => Ok(GapPolicy::Zeroize),
            "previous" => Ok(GapPolicy::Previous),
            "default" => Ok(GapPolicy::Default),
            other => Err(format!("Unknown blank handling '{}'", other)),
        }
    }
}

/// Наблюдаемые значения по датам. Точки без числа не попадают в карту;
/// при нескольких точках на одну дату побеждает первая.
pub fn observed_values(points: &[DataPoint]) -> BTreeMap<NaiveDate, f64> {
    let mut observed = BTreeMap::new();
    for point in points {
        if let Some(value) = point.numeric_value {
            observed.entry(point.date).or_insert(value);
        }
    }
    observed
}

/// Значения ряда для каждой даты оси.
///
/// `default_fill` уже разобранное значение по умолчанию категории
/// (используется только политикой `Default`).
pub fn fill_gaps(
    axis: &[NaiveDate],
    observed: &BTreeMap<NaiveDate, f64>,
    policy: GapPolicy,
    default_fill: f64,
) -> Vec<Option<f64>> {
    let mut resolved: Vec<Option<f64>> = Vec::with_capacity(axis.len());

    // идем по возрастанию, чтобы Previous видел уже заполненные значения
    for date in axis {
        let value = match observed.get(date) {
            Some(v) => Some(*v),
            None => match policy {
                GapPolicy::Skip => None,
                GapPolicy::Zeroize => Some(0.0),
                GapPolicy::Previous => Some(resolved.last().copied().flatten().unwrap_or(0.0)),
                GapPolicy::Default => Some(default_fill),
            },
        };
        resolved.push(value);
    }

    resolved
}
