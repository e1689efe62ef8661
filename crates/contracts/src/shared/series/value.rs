//! Разбор сырых значений записей: отображаемая строка и число для графика

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Сколько минут в сутках; время хранится как минуты от полуночи
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Как трактуется сырое значение записи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    Time,
    Boolean,
    Text,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::Time => "time",
            ValueKind::Boolean => "boolean",
            ValueKind::Text => "text",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Шаги кнопок +/- категории
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Increments {
    pub positive: f64,
    pub negative: f64,
}

impl Default for Increments {
    fn default() -> Self {
        Self {
            positive: 1.0,
            negative: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    Up,
    Down,
}

/// "HH:MM" или "HH:MM:SS" -> минуты от полуночи (секунды дают дробную часть)
pub fn parse_time_to_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let time = NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()?;
    Some(time.hour() as f64 * 60.0 + time.minute() as f64 + time.second() as f64 / 60.0)
}

/// Минуты от полуночи -> "HH:MM" (или "HH:MM:SS", если есть секунды).
/// Значения вне суток заворачиваются по модулю 24 часов.
pub fn parse_number_to_time(minutes: f64) -> String {
    if !minutes.is_finite() {
        return "00:00".to_string();
    }
    let total_seconds = (minutes * 60.0).round() as i64;
    let total_seconds = total_seconds.rem_euclid(MINUTES_PER_DAY * 60);
    let hours = total_seconds / 3600;
    let mins = total_seconds % 3600 / 60;
    let secs = total_seconds % 60;
    if secs == 0 {
        format!("{:02}:{:02}", hours, mins)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_boolean(raw: &str) -> Option<f64> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(1.0),
        "false" => Some(0.0),
        _ => None,
    }
}

/// Числовое значение для графика и арифметики; None означает "нет значения"
pub fn parse_value_to_number(raw: &str, kind: ValueKind) -> Option<f64> {
    match kind {
        ValueKind::Number => parse_number(raw),
        ValueKind::Time => parse_time_to_number(raw),
        ValueKind::Boolean => parse_boolean(raw),
        ValueKind::Text => None,
    }
}

/// Строка для отображения. Нераспознанное значение показывается как есть.
pub fn parse_value_to_display(raw: &str, kind: ValueKind) -> String {
    match kind {
        ValueKind::Number => parse_number(raw)
            .map(format_number)
            .unwrap_or_else(|| raw.trim().to_string()),
        ValueKind::Time => parse_time_to_number(raw)
            .map(parse_number_to_time)
            .unwrap_or_else(|| raw.trim().to_string()),
        ValueKind::Boolean => match parse_boolean(raw) {
            Some(v) if v > 0.0 => "Yes".to_string(),
            Some(_) => "No".to_string(),
            None => raw.trim().to_string(),
        },
        ValueKind::Text => raw.to_string(),
    }
}

/// Кратчайшая десятичная запись без шума плавающей точки (0.1 + 0.2 -> "0.3")
pub fn format_number(value: f64) -> String {
    let scaled = value * 1e9;
    // у очень больших чисел дробной части нет, округлять нечего
    let rounded = if scaled.is_finite() {
        scaled.round() / 1e9
    } else {
        value
    };
    if rounded == 0.0 {
        // убираем "-0"
        return "0".to_string();
    }
    format!("{}", rounded)
}

/// Изменить значение на шаг категории (экран дня, кнопки +/-).
///
/// Пустое значение считается нулем. Поддерживаются только числа и время.
pub fn step_value(
    raw: &str,
    kind: ValueKind,
    direction: StepDirection,
    increments: Increments,
) -> anyhow::Result<String> {
    if !matches!(kind, ValueKind::Number | ValueKind::Time) {
        anyhow::bail!("Values of kind '{}' cannot be incremented", kind);
    }

    let current = if raw.trim().is_empty() {
        0.0
    } else {
        parse_value_to_number(raw, kind)
            .ok_or_else(|| anyhow::anyhow!("'{}' is not a valid {} value", raw, kind))?
    };

    let next = match direction {
        StepDirection::Up => current + increments.positive,
        StepDirection::Down => current - increments.negative,
    };

    Ok(match kind {
        ValueKind::Time => parse_number_to_time(next),
        _ => format_number(next),
    })
}
