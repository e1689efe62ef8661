use serde::{Deserialize, Serialize};
use crate::domain::a001_data_type::aggregate::{DataType, DataTypeId};
use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::series::{Increments, ValueKind};

// ============================================================================
// ID Type
// ============================================================================

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор категории
    DataCategoryId
);

pub const DEFAULT_INCREMENT: f64 = 1.0;

// ============================================================================
// Aggregate Root
// ============================================================================

/// Категория отслеживаемых данных (например, "Weight" или "Mood")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCategory {
    #[serde(flatten)]
    pub base: BaseAggregate<DataCategoryId>,

    /// Сырое значение по умолчанию, трактуется согласно типу данных
    #[serde(rename = "defaultValue")]
    pub default_value: String,

    #[serde(rename = "addDefault")]
    pub add_default: bool,

    #[serde(rename = "positiveIncrement")]
    pub positive_increment: f64,

    #[serde(rename = "negativeIncrement")]
    pub negative_increment: f64,

    #[serde(rename = "dataTypeId")]
    pub data_type_id: DataTypeId,

    /// Счетчик записей. Поддерживается инкрементально, это кэш, а не источник истины.
    #[serde(rename = "entryCount")]
    pub entry_count: i64,
}

impl DataCategory {
    /// Создать новую категорию для вставки в БД
    pub fn new_for_insert(name: String, note: String, data_type_id: DataTypeId) -> Self {
        Self {
            base: BaseAggregate::new(DataCategoryId::new_v4(), name, note),
            default_value: String::new(),
            add_default: false,
            positive_increment: DEFAULT_INCREMENT,
            negative_increment: DEFAULT_INCREMENT,
            data_type_id,
            entry_count: 0,
        }
    }

    /// Создать категорию из DTO (id и счетчик задаются заново)
    pub fn from_dto(dto: &DataCategoryDto, data_type_id: DataTypeId) -> Self {
        let mut category = Self::new_for_insert(
            dto.name.clone(),
            dto.note.clone().unwrap_or_default(),
            data_type_id,
        );
        category.update(dto, data_type_id);
        category
    }

    /// Получить ID как строку
    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Обновить данные из DTO. Счетчик записей не трогаем.
    pub fn update(&mut self, dto: &DataCategoryDto, data_type_id: DataTypeId) {
        self.base.name = dto.name.clone();
        self.base.note = dto.note.clone().unwrap_or_default();
        self.default_value = dto.default_value.clone().unwrap_or_default();
        self.add_default = dto.add_default.unwrap_or(false);
        self.positive_increment = dto.positive_increment.unwrap_or(DEFAULT_INCREMENT);
        self.negative_increment = dto.negative_increment.unwrap_or(DEFAULT_INCREMENT);
        self.data_type_id = data_type_id;
    }

    pub fn increments(&self) -> Increments {
        Increments {
            positive: self.positive_increment,
            negative: self.negative_increment,
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.name.trim().is_empty() {
            return Err("Name must not be empty".into());
        }
        for (label, value) in [
            ("positiveIncrement", self.positive_increment),
            ("negativeIncrement", self.negative_increment),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be a positive number", label));
            }
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for DataCategory {
    type Id = DataCategoryId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "data_category"
    }

    fn element_name() -> &'static str {
        "Data Category"
    }

    fn list_name() -> &'static str {
        "Data Categories"
    }
}

// ============================================================================
// Enriched view
// ============================================================================

/// Категория вместе с уже загруженным типом данных
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCategoryWithType {
    #[serde(flatten)]
    pub category: DataCategory,

    #[serde(rename = "dataType")]
    pub data_type: DataType,
}

impl DataCategoryWithType {
    pub fn new(category: DataCategory, data_type: DataType) -> Self {
        Self {
            category,
            data_type,
        }
    }

    pub fn id(&self) -> DataCategoryId {
        self.category.base.id
    }

    pub fn name(&self) -> &str {
        &self.category.base.name
    }

    pub fn value_kind(&self) -> ValueKind {
        self.data_type.value_kind()
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// DTO для создания/обновления категории
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataCategoryDto {
    pub id: Option<String>,
    pub name: String,
    pub note: Option<String>,

    #[serde(rename = "defaultValue")]
    pub default_value: Option<String>,

    #[serde(rename = "addDefault")]
    pub add_default: Option<bool>,

    #[serde(rename = "positiveIncrement")]
    pub positive_increment: Option<f64>,

    #[serde(rename = "negativeIncrement")]
    pub negative_increment: Option<f64>,

    #[serde(rename = "dataTypeId")]
    pub data_type_id: String,
}
