use contracts::domain::a001_data_type::aggregate::{DataType, DataTypeDto, InputType};
use contracts::domain::common::AggregateRoot;
use contracts::shared::events::ChangeEvent;
use uuid::Uuid;

use super::repository;
use crate::domain::a002_data_category;
use crate::shared::error::{parse_uuid, ServiceError};
use crate::shared::events;

/// Встроенные типы данных, создаются при первом запуске
pub const BUILTIN_TYPES: &[(&str, &str, InputType, bool)] = &[
    ("Number", "Any real number", InputType::Number, false),
    ("Time", "Clock time, HH:MM", InputType::Time, false),
    ("Boolean", "true / false", InputType::Boolean, false),
    ("Text", "Free text, not chartable", InputType::Text, false),
    ("Select Numeric", "One of a fixed set of numbers", InputType::SelectNumeric, false),
];

/// Создание нового типа данных
pub async fn create(dto: DataTypeDto) -> anyhow::Result<Uuid> {
    let mut aggregate = DataType::new_for_insert(
        dto.name,
        dto.note.unwrap_or_default(),
        dto.input_type,
        dto.is_complex.unwrap_or(false),
    );

    aggregate.validate().map_err(ServiceError::Validation)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    events::publish(ChangeEvent::created(
        DataType::collection_name(),
        id.to_string(),
        &aggregate,
    ));
    Ok(id)
}

/// Создать тип, только если типа с таким именем еще нет.
/// Возвращает id и признак того, что тип был создан.
pub async fn create_unique(dto: DataTypeDto) -> anyhow::Result<(Uuid, bool)> {
    if let Some(existing) = repository::get_by_name(dto.name.trim()).await? {
        tracing::debug!("DataType \"{}\" already exists, skipping", dto.name);
        return Ok((existing.base.id.value(), false));
    }
    let id = create(dto).await?;
    Ok((id, true))
}

/// Создать недостающие встроенные типы
pub async fn seed_builtin_types() -> anyhow::Result<usize> {
    let mut created = 0;
    for (name, note, input_type, is_complex) in BUILTIN_TYPES {
        let dto = DataTypeDto {
            id: None,
            name: name.to_string(),
            note: Some(note.to_string()),
            input_type: *input_type,
            is_complex: Some(*is_complex),
        };
        if create_unique(dto).await?.1 {
            tracing::info!("Created built-in DataType: {}", name);
            created += 1;
        }
    }
    Ok(created)
}

/// Обновление существующего типа данных
pub async fn update(dto: DataTypeDto) -> anyhow::Result<()> {
    let raw_id = dto
        .id
        .clone()
        .ok_or_else(|| ServiceError::BadRequest("missing id".into()))?;
    let id = parse_uuid(&raw_id, "data type")?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(DataType::element_name().into()))?;

    aggregate.update(&dto);
    aggregate.validate().map_err(ServiceError::Validation)?;
    aggregate.before_write();

    repository::update(&aggregate).await?;
    events::publish(ChangeEvent::updated(
        DataType::collection_name(),
        id.to_string(),
        &aggregate,
    ));
    Ok(())
}

/// Удаление типа. Тип, на который ссылаются категории, удалить нельзя.
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    let in_use = a002_data_category::repository::count_by_data_type(id).await?;
    if in_use > 0 {
        return Err(ServiceError::Conflict(format!(
            "data type is used by {} categor{}",
            in_use,
            if in_use == 1 { "y" } else { "ies" }
        ))
        .into());
    }

    let deleted = repository::delete(id).await?;
    if deleted {
        events::publish(ChangeEvent::deleted(DataType::collection_name(), id.to_string()));
    }
    Ok(deleted)
}

/// Удалить все неиспользуемые типы (отладочная операция)
pub async fn delete_unused() -> anyhow::Result<u64> {
    let removed = repository::delete_unused().await?;
    tracing::info!("Deleted {} unused data types", removed);
    Ok(removed)
}

/// Получение типа по ID
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DataType>> {
    repository::get_by_id(id).await
}

/// Список всех типов, по имени
pub async fn list_all() -> anyhow::Result<Vec<DataType>> {
    repository::list_all().await
}
