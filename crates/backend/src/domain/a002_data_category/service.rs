use contracts::domain::a001_data_type::aggregate::DataType;
use contracts::domain::a002_data_category::aggregate::{
    DataCategory, DataCategoryDto, DataCategoryWithType,
};
use contracts::domain::a003_data_entry::aggregate::DataEntry;
use contracts::domain::common::AggregateRoot;
use contracts::shared::events::ChangeEvent;
use contracts::shared::series::{self, ValueKind};
use uuid::Uuid;

use super::repository;
use crate::domain::{a001_data_type, a003_data_entry};
use crate::shared::error::{parse_uuid, ServiceError};
use crate::shared::events;

/// Загрузить тип данных, на который ссылается DTO
async fn resolve_data_type(raw_id: &str) -> anyhow::Result<DataType> {
    let id = parse_uuid(raw_id, "data type")?;
    let data_type = a001_data_type::repository::get_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::Validation(format!("data type {} does not exist", id)))?;
    Ok(data_type)
}

/// Значение по умолчанию должно разбираться согласно типу
fn validate_default_value(category: &DataCategory, data_type: &DataType) -> Result<(), String> {
    let raw = category.default_value.trim();
    let kind = data_type.value_kind();
    if raw.is_empty() || kind == ValueKind::Text {
        return Ok(());
    }
    match series::parse_value_to_number(raw, kind) {
        Some(_) => Ok(()),
        None => Err(format!("defaultValue '{}' is not a valid {} value", raw, kind)),
    }
}

fn validate(category: &DataCategory, data_type: &DataType) -> Result<(), ServiceError> {
    category
        .validate()
        .and_then(|_| validate_default_value(category, data_type))
        .map_err(ServiceError::Validation)
}

/// Создание новой категории
pub async fn create(dto: DataCategoryDto) -> anyhow::Result<Uuid> {
    let data_type = resolve_data_type(&dto.data_type_id).await?;
    let mut aggregate = DataCategory::from_dto(&dto, data_type.base.id);

    validate(&aggregate, &data_type)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    events::publish(ChangeEvent::created(
        DataCategory::collection_name(),
        id.to_string(),
        &DataCategoryWithType::new(aggregate, data_type),
    ));
    Ok(id)
}

/// Обновление существующей категории
pub async fn update(dto: DataCategoryDto) -> anyhow::Result<()> {
    let raw_id = dto
        .id
        .clone()
        .ok_or_else(|| ServiceError::BadRequest("missing id".into()))?;
    let id = parse_uuid(&raw_id, "data category")?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(DataCategory::element_name().into()))?;
    let data_type = resolve_data_type(&dto.data_type_id).await?;

    aggregate.update(&dto, data_type.base.id);
    validate(&aggregate, &data_type)?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    events::publish(ChangeEvent::updated(
        DataCategory::collection_name(),
        id.to_string(),
        &DataCategoryWithType::new(aggregate, data_type),
    ));
    Ok(())
}

/// Удаление категории вместе с ее записями
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    let (deleted, removed_entries) = repository::delete_cascade(id).await?;
    if deleted {
        tracing::info!("Deleted category {} with {} entries", id, removed_entries);
        events::publish(ChangeEvent::deleted(
            DataCategory::collection_name(),
            id.to_string(),
        ));
    }
    Ok(deleted)
}

/// Пересчитать счетчик записей категории
pub async fn recount(id: Uuid) -> anyhow::Result<i64> {
    let category = repository::get_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(DataCategory::element_name().into()))?;

    let actual = repository::recount(id).await?;
    if actual != category.entry_count {
        tracing::warn!(
            "Category {} entryCount drifted: cached {}, actual {}",
            id,
            category.entry_count,
            actual
        );
    }
    Ok(actual)
}

/// Записи категории, новые первыми
pub async fn list_entries(id: Uuid) -> anyhow::Result<Vec<DataEntry>> {
    if repository::get_by_id(id).await?.is_none() {
        return Err(ServiceError::NotFound(DataCategory::element_name().into()).into());
    }
    a003_data_entry::repository::list_by_category(id).await
}

/// Получение категории по ID (с типом данных)
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DataCategoryWithType>> {
    repository::get_with_type(id).await
}

/// Список всех категорий с типами, по имени
pub async fn list_all() -> anyhow::Result<Vec<DataCategoryWithType>> {
    repository::list_with_types().await
}
