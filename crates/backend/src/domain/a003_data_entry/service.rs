use chrono::{Duration, NaiveDate, Utc};
use contracts::domain::a001_data_type::aggregate::InputType;
use contracts::domain::a002_data_category::aggregate::{DataCategoryId, DataCategoryWithType};
use contracts::domain::a003_data_entry::aggregate::{
    DataEntry, DataEntryDto, DataEntryPage, DataEntryWithCategory, DaySummary,
};
use contracts::domain::common::AggregateRoot;
use contracts::shared::events::ChangeEvent;
use contracts::shared::series::{self, StepDirection};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::cursor::PageCursor;
use super::repository;
use crate::domain::a002_data_category;
use crate::shared::error::{parse_uuid, ServiceError};
use crate::shared::events;

pub const MAX_PAGE_SIZE: u64 = 500;

/// Сколько дней тестовых данных создается для каждой числовой категории
pub const TEST_DATA_DAYS: i64 = 49;

/// Загрузить категорию записи (вместе с типом)
async fn resolve_category(raw_id: &str) -> anyhow::Result<DataCategoryWithType> {
    let id = parse_uuid(raw_id, "data category")?;
    let category = a002_data_category::repository::get_with_type(id)
        .await?
        .ok_or_else(|| ServiceError::Validation(format!("data category {} does not exist", id)))?;
    Ok(category)
}

fn publish_entry(event: fn(&str, String, &DataEntry) -> ChangeEvent, entry: &DataEntry) {
    events::publish(event(DataEntry::collection_name(), entry.to_string_id(), entry));
}

/// Создание новой записи
pub async fn create(dto: DataEntryDto) -> anyhow::Result<Uuid> {
    let category = resolve_category(&dto.data_category_id).await?;
    let mut aggregate = DataEntry::new_for_insert(
        category.id(),
        dto.date,
        dto.value,
        dto.note.unwrap_or_default(),
    );

    aggregate
        .validate(category.value_kind())
        .map_err(ServiceError::Validation)?;
    aggregate.before_write();

    let id = repository::insert(&aggregate).await?;
    publish_entry(ChangeEvent::created, &aggregate);
    Ok(id)
}

/// Обновление существующей записи (в том числе перенос в другую категорию)
pub async fn update(dto: DataEntryDto) -> anyhow::Result<()> {
    let raw_id = dto
        .id
        .clone()
        .ok_or_else(|| ServiceError::BadRequest("missing id".into()))?;
    let id = parse_uuid(&raw_id, "data entry")?;

    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(DataEntry::element_name().into()))?;
    let previous_category = aggregate.data_category_id;
    let category = resolve_category(&dto.data_category_id).await?;

    aggregate.update(&dto, category.id());
    aggregate
        .validate(category.value_kind())
        .map_err(ServiceError::Validation)?;
    aggregate.before_write();

    repository::update(&aggregate, previous_category).await?;
    publish_entry(ChangeEvent::updated, &aggregate);
    Ok(())
}

/// Удаление записи
pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    match repository::delete(id).await? {
        Some(entry) => {
            events::publish(ChangeEvent::deleted(
                DataEntry::collection_name(),
                entry.to_string_id(),
            ));
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Получение записи по ID
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DataEntry>> {
    repository::get_by_id(id).await
}

/// Страница списка записей (дата по убыванию)
pub async fn list_page(
    limit: Option<u64>,
    next_token: Option<&str>,
    default_page_size: u64,
) -> anyhow::Result<DataEntryPage> {
    let limit = limit.unwrap_or(default_page_size).clamp(1, MAX_PAGE_SIZE);
    let cursor = match next_token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => Some(
            PageCursor::decode(token).map_err(|e| ServiceError::BadRequest(e.to_string()))?,
        ),
        None => None,
    };

    let (items, has_more) = repository::list_page(cursor.as_ref(), limit).await?;
    let next_token = match (has_more, items.last()) {
        (true, Some(last)) => Some(PageCursor::new(last.date, last.to_string_id()).encode()),
        _ => None,
    };

    Ok(DataEntryPage { items, next_token })
}

/// Данные экрана дня: записи с категориями и еще не заполненные категории
pub async fn day_summary(date: NaiveDate) -> anyhow::Result<DaySummary> {
    let categories = a002_data_category::repository::list_with_types().await?;
    let by_id: HashMap<DataCategoryId, &DataCategoryWithType> =
        categories.iter().map(|c| (c.id(), c)).collect();

    let mut entries: Vec<DataEntryWithCategory> = repository::list_by_date(date)
        .await?
        .into_iter()
        .filter_map(|entry| {
            let category = by_id.get(&entry.data_category_id)?;
            Some(DataEntryWithCategory {
                data_category: (*category).clone(),
                entry,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        a.data_category
            .name()
            .to_lowercase()
            .cmp(&b.data_category.name().to_lowercase())
    });

    let logged: HashSet<DataCategoryId> =
        entries.iter().map(|e| e.entry.data_category_id).collect();
    let available_categories = categories
        .iter()
        .filter(|c| !logged.contains(&c.id()))
        .cloned()
        .collect();

    Ok(DaySummary {
        date,
        entries,
        available_categories,
    })
}

/// Добавить записи на дату по выбранным категориям со значением по умолчанию
pub async fn add_day_entries(date: NaiveDate, category_ids: &[String]) -> anyhow::Result<Vec<Uuid>> {
    let mut created = Vec::with_capacity(category_ids.len());
    for raw_id in category_ids {
        let category = resolve_category(raw_id).await?;
        let dto = DataEntryDto {
            id: None,
            date,
            value: category.category.default_value.clone(),
            note: None,
            data_category_id: category.id().to_string(),
        };
        created.push(create(dto).await?);
    }
    Ok(created)
}

/// Изменить значение записи на шаг категории. Возвращает обновленную запись.
pub async fn step(id: Uuid, direction: StepDirection) -> anyhow::Result<DataEntry> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(DataEntry::element_name().into()))?;
    let category = a002_data_category::repository::get_with_type(aggregate.data_category_id.value())
        .await?
        .ok_or_else(|| ServiceError::NotFound("Data Category".into()))?;

    if !category.data_type.is_steppable() {
        return Err(ServiceError::BadRequest(format!(
            "entries of type '{}' cannot be incremented",
            category.data_type.input_type
        ))
        .into());
    }

    aggregate.value = series::step_value(
        &aggregate.value,
        category.value_kind(),
        direction,
        category.category.increments(),
    )
    .map_err(|e| ServiceError::Validation(e.to_string()))?;
    aggregate.before_write();

    let previous_category = aggregate.data_category_id;
    repository::update(&aggregate, previous_category).await?;
    publish_entry(ChangeEvent::updated, &aggregate);
    Ok(aggregate)
}

/// Тестовые записи: по одной в день за последние 49 дней для каждой числовой категории
pub async fn insert_test_data() -> anyhow::Result<usize> {
    let today = Utc::now().date_naive();
    let categories = a002_data_category::repository::list_with_types().await?;

    let mut batch = Vec::new();
    for category in categories
        .iter()
        .filter(|c| c.data_type.input_type == InputType::Number)
    {
        for x in 1..=TEST_DATA_DAYS {
            let mut entry = DataEntry::new_for_insert(
                category.id(),
                today - Duration::days(x),
                x.to_string(),
                String::new(),
            );
            entry.before_write();
            batch.push(entry);
        }
    }

    let inserted = repository::insert_many(&batch).await?;
    tracing::info!("Inserted {} test entries", inserted);
    for entry in &batch {
        publish_entry(ChangeEvent::created, entry);
    }
    Ok(inserted)
}

/// Удалить все записи (отладочная операция)
pub async fn delete_all() -> anyhow::Result<u64> {
    let removed = repository::delete_all().await?;
    tracing::info!("Deleted all {} entries", removed);
    events::publish(ChangeEvent::deleted(DataEntry::collection_name(), "*".into()));
    Ok(removed)
}
