use serde::{Deserialize, Serialize};
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::series::ValueKind;

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор типа данных
    DataTypeId
);

// ============================================================================
// Input type
// ============================================================================

/// Вид ввода значения для категорий этого типа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputType {
    Number,
    Time,
    #[serde(alias = "boolean-string")]
    Boolean,
    Text,
    /// Выбор из фиксированного набора числовых значений
    SelectNumeric,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Number => "number",
            InputType::Time => "time",
            InputType::Boolean => "boolean",
            InputType::Text => "text",
            InputType::SelectNumeric => "select-numeric",
        }
    }

    /// Разбор значения, сохраненного в БД. Старое "boolean-string" тоже принимается.
    pub fn from_db(s: &str) -> Option<Self> {
        match s.trim() {
            "number" => Some(InputType::Number),
            "time" => Some(InputType::Time),
            "boolean" | "boolean-string" => Some(InputType::Boolean),
            "text" => Some(InputType::Text),
            "select-numeric" => Some(InputType::SelectNumeric),
            _ => None,
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Тип данных, который определяет, как трактуется значение записи
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataType {
    #[serde(flatten)]
    pub base: BaseAggregate<DataTypeId>,

    #[serde(rename = "inputType")]
    pub input_type: InputType,

    #[serde(rename = "isComplex")]
    pub is_complex: bool,
}

impl DataType {
    /// Создать новый тип данных для вставки в БД
    pub fn new_for_insert(name: String, note: String, input_type: InputType, is_complex: bool) -> Self {
        Self {
            base: BaseAggregate::new(DataTypeId::new_v4(), name, note),
            input_type,
            is_complex,
        }
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Как парсер значений должен трактовать сырое значение
    pub fn value_kind(&self) -> ValueKind {
        match self.input_type {
            InputType::Number | InputType::SelectNumeric => ValueKind::Number,
            InputType::Time => ValueKind::Time,
            InputType::Boolean => ValueKind::Boolean,
            InputType::Text if self.is_complex => ValueKind::Number,
            InputType::Text => ValueKind::Text,
        }
    }

    /// Можно ли строить график по категориям этого типа
    pub fn is_chartable(&self) -> bool {
        self.is_complex
            || matches!(
                self.input_type,
                InputType::Number | InputType::Boolean | InputType::Time | InputType::SelectNumeric
            )
    }

    /// Поддерживает ли тип кнопки +/- на экране дня
    pub fn is_steppable(&self) -> bool {
        matches!(self.input_type, InputType::Number | InputType::Time)
    }

    /// Обновить данные из DTO
    pub fn update(&mut self, dto: &DataTypeDto) {
        self.base.name = dto.name.clone();
        self.base.note = dto.note.clone().unwrap_or_default();
        self.input_type = dto.input_type;
        self.is_complex = dto.is_complex.unwrap_or(self.is_complex);
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.name.trim().is_empty() {
            return Err("Name must not be empty".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for DataType {
    type Id = DataTypeId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "data_type"
    }

    fn element_name() -> &'static str {
        "Data Type"
    }

    fn list_name() -> &'static str {
        "Data Types"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления типа данных
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTypeDto {
    pub id: Option<String>,
    pub name: String,
    pub note: Option<String>,

    #[serde(rename = "inputType")]
    pub input_type: InputType,

    #[serde(rename = "isComplex")]
    pub is_complex: Option<bool>,
}
