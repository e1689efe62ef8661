use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::domain::a002_data_category::aggregate::{DataCategoryId, DataCategoryWithType};
use crate::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use crate::shared::series::{self, StepDirection, ValueKind};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор записи
    DataEntryId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Одно наблюдение по категории на конкретную дату
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEntry {
    pub id: DataEntryId,

    /// Календарная дата (без времени и часового пояса)
    pub date: NaiveDate,

    /// Сырое значение, трактуется согласно типу данных категории
    pub value: String,

    pub note: String,

    #[serde(rename = "dataCategoryId")]
    pub data_category_id: DataCategoryId,

    pub metadata: EntityMetadata,
}

impl DataEntry {
    /// Создать новую запись для вставки в БД
    pub fn new_for_insert(
        data_category_id: DataCategoryId,
        date: NaiveDate,
        value: String,
        note: String,
    ) -> Self {
        Self {
            id: DataEntryId::new_v4(),
            date,
            value,
            note,
            data_category_id,
            metadata: EntityMetadata::new(),
        }
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &DataEntryDto, data_category_id: DataCategoryId) {
        self.date = dto.date;
        self.value = dto.value.clone();
        self.note = dto.note.clone().unwrap_or_default();
        self.data_category_id = data_category_id;
    }

    /// Валидация значения относительно вида данных категории.
    ///
    /// Пустое значение допустимо: так выглядит запись, добавленная на экране дня
    /// для категории без значения по умолчанию.
    pub fn validate(&self, kind: ValueKind) -> Result<(), String> {
        if self.value.trim().is_empty() {
            return Ok(());
        }
        match kind {
            ValueKind::Text => Ok(()),
            _ if series::parse_value_to_number(&self.value, kind).is_some() => Ok(()),
            _ => Err(format!("'{}' is not a valid {} value", self.value, kind)),
        }
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.metadata.touch();
        self.metadata.increment_version();
    }
}

impl AggregateRoot for DataEntry {
    type Id = DataEntryId;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.metadata
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "data_entry"
    }

    fn element_name() -> &'static str {
        "Data Entry"
    }

    fn list_name() -> &'static str {
        "Data Entries"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления записи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEntryDto {
    pub id: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub value: String,
    pub note: Option<String>,

    #[serde(rename = "dataCategoryId")]
    pub data_category_id: String,
}

/// Страница списка записей (по дате, новые первыми)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEntryPage {
    pub items: Vec<DataEntry>,
    /// Курсор следующей страницы; None, если записей больше нет
    #[serde(rename = "nextToken")]
    pub next_token: Option<String>,
}

/// Запись вместе с категорией и ее типом
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEntryWithCategory {
    #[serde(flatten)]
    pub entry: DataEntry,

    #[serde(rename = "dataCategory")]
    pub data_category: DataCategoryWithType,
}

/// Данные экрана дня
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Записи за день, отсортированы по имени категории
    pub entries: Vec<DataEntryWithCategory>,
    /// Категории, по которым за этот день еще нет записей
    #[serde(rename = "availableCategories")]
    pub available_categories: Vec<DataCategoryWithType>,
}

/// Добавить записи за день по выбранным категориям
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDayEntriesRequest {
    #[serde(rename = "categoryIds")]
    pub category_ids: Vec<String>,
}

/// Изменить значение записи кнопкой +/-
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEntryRequest {
    pub direction: StepDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: &str) -> DataEntry {
        DataEntry::new_for_insert(
            DataCategoryId::new_v4(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            value.into(),
            String::new(),
        )
    }

    #[test]
    fn test_validate_by_kind() {
        assert!(entry("5.5").validate(ValueKind::Number).is_ok());
        assert!(entry("abc").validate(ValueKind::Number).is_err());
        assert!(entry("07:30").validate(ValueKind::Time).is_ok());
        assert!(entry("25:00").validate(ValueKind::Time).is_err());
        assert!(entry("true").validate(ValueKind::Boolean).is_ok());
        assert!(entry("yes").validate(ValueKind::Boolean).is_err());
        assert!(entry("anything").validate(ValueKind::Text).is_ok());
    }

    #[test]
    fn test_blank_value_allowed() {
        assert!(entry("").validate(ValueKind::Number).is_ok());
        assert!(entry("  ").validate(ValueKind::Time).is_ok());
    }

    #[test]
    fn test_date_wire_format() {
        let json = serde_json::to_value(entry("1")).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert!(json.get("dataCategoryId").is_some());
    }

    #[test]
    fn test_dto_parses_date() {
        let dto: DataEntryDto = serde_json::from_str(
            r#"{"date":"2024-02-29","value":"3","dataCategoryId":"x"}"#,
        )
        .unwrap();
        assert_eq!(dto.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(dto.id.is_none());
    }
}
