use anyhow::Context;
use chrono::{NaiveDate, Utc};
use contracts::domain::a002_data_category::aggregate::DataCategoryId;
use contracts::domain::a003_data_entry::aggregate::{DataEntry, DataEntryId};
use contracts::domain::common::{AggregateId, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cursor::PageCursor;
use crate::domain::a002_data_category::repository as categories;
use crate::shared::data::db::get_connection;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_data_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// YYYY-MM-DD, сортируется лексикографически
    pub date: String,
    pub value: String,
    pub note: String,
    pub data_category_id: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DataEntry {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let category_uuid = Uuid::parse_str(&m.data_category_id).unwrap_or_else(|_| Uuid::nil());
        let date = NaiveDate::parse_from_str(&m.date, DATE_FORMAT).unwrap_or_else(|_| {
            tracing::warn!("Entry {} has malformed date '{}'", m.id, m.date);
            NaiveDate::default()
        });

        DataEntry {
            id: DataEntryId(uuid),
            date,
            value: m.value,
            note: m.note,
            data_category_id: DataCategoryId(category_uuid),
            metadata,
        }
    }
}

fn conn() -> anyhow::Result<&'static DatabaseConnection> {
    get_connection()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn to_active(aggregate: &DataEntry) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.value().to_string()),
        date: Set(format_date(aggregate.date)),
        value: Set(aggregate.value.clone()),
        note: Set(aggregate.note.clone()),
        data_category_id: Set(aggregate.data_category_id.value().to_string()),
        created_at: Set(Some(aggregate.metadata.created_at)),
        updated_at: Set(Some(aggregate.metadata.updated_at)),
        version: Set(aggregate.metadata.version),
    }
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DataEntry>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()?).await?;
    Ok(result.map(Into::into))
}

/// Страница записей: дата по убыванию, затем id по убыванию.
/// Возвращает записи и признак того, что есть еще.
pub async fn list_page(
    after: Option<&PageCursor>,
    limit: u64,
) -> anyhow::Result<(Vec<DataEntry>, bool)> {
    let mut query = Entity::find()
        .order_by_desc(Column::Date)
        .order_by_desc(Column::Id);

    if let Some(cursor) = after {
        let date = format_date(cursor.date);
        query = query.filter(
            Condition::any().add(Column::Date.lt(date.clone())).add(
                Condition::all()
                    .add(Column::Date.eq(date))
                    .add(Column::Id.lt(cursor.id.clone())),
            ),
        );
    }

    // на одну больше, чтобы понять, есть ли следующая страница
    let mut rows = query.limit(limit + 1).all(conn()?).await?;
    let has_more = rows.len() as u64 > limit;
    rows.truncate(limit as usize);
    Ok((rows.into_iter().map(Into::into).collect(), has_more))
}

pub async fn list_by_date(date: NaiveDate) -> anyhow::Result<Vec<DataEntry>> {
    let items = Entity::find()
        .filter(Column::Date.eq(format_date(date)))
        .order_by_asc(Column::CreatedAt)
        .all(conn()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Все записи категории, новые первыми
pub async fn list_by_category(category_id: Uuid) -> anyhow::Result<Vec<DataEntry>> {
    let items = Entity::find()
        .filter(Column::DataCategoryId.eq(category_id.to_string()))
        .order_by_desc(Column::Date)
        .order_by_desc(Column::UpdatedAt)
        .all(conn()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Записи категории в диапазоне дат включительно.
/// По дате по возрастанию; внутри одной даты последняя записанная идет первой.
pub async fn list_by_category_in_range(
    category_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<DataEntry>> {
    let items = Entity::find()
        .filter(Column::DataCategoryId.eq(category_id.to_string()))
        .filter(Column::Date.between(format_date(start), format_date(end)))
        .order_by_asc(Column::Date)
        .order_by_desc(Column::UpdatedAt)
        .order_by_desc(Column::Version)
        .all(conn()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Вставка записи и увеличение счетчика категории одной транзакцией
pub async fn insert(aggregate: &DataEntry) -> anyhow::Result<Uuid> {
    let uuid = aggregate.id.value();
    let txn = conn()?.begin().await?;

    to_active(aggregate)
        .insert(&txn)
        .await
        .with_context(|| format!("insert data entry {}", uuid))?;
    categories::adjust_entry_count(&txn, &aggregate.data_category_id.as_string(), 1).await?;

    txn.commit().await?;
    Ok(uuid)
}

/// Вставка нескольких записей одной транзакцией
pub async fn insert_many(aggregates: &[DataEntry]) -> anyhow::Result<usize> {
    let txn = conn()?.begin().await?;
    for aggregate in aggregates {
        to_active(aggregate).insert(&txn).await?;
        categories::adjust_entry_count(&txn, &aggregate.data_category_id.as_string(), 1).await?;
    }
    txn.commit().await?;
    Ok(aggregates.len())
}

/// Обновление записи. При смене категории единица счетчика переносится.
pub async fn update(aggregate: &DataEntry, previous_category: DataCategoryId) -> anyhow::Result<()> {
    let txn = conn()?.begin().await?;

    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active
        .update(&txn)
        .await
        .with_context(|| format!("update data entry {}", aggregate.id))?;

    if previous_category != aggregate.data_category_id {
        categories::adjust_entry_count(&txn, &previous_category.as_string(), -1).await?;
        categories::adjust_entry_count(&txn, &aggregate.data_category_id.as_string(), 1).await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Удаление записи и уменьшение счетчика. Возвращает удаленную запись.
pub async fn delete(id: Uuid) -> anyhow::Result<Option<DataEntry>> {
    let txn = conn()?.begin().await?;

    let Some(model) = Entity::find_by_id(id.to_string()).one(&txn).await? else {
        return Ok(None);
    };
    let category_id = model.data_category_id.clone();
    Entity::delete_by_id(id.to_string())
        .exec(&txn)
        .await
        .with_context(|| format!("delete data entry {}", id))?;
    categories::adjust_entry_count(&txn, &category_id, -1).await?;

    txn.commit().await?;
    Ok(Some(model.into()))
}

/// Удалить все записи и обнулить счетчики
pub async fn delete_all() -> anyhow::Result<u64> {
    let txn = conn()?.begin().await?;

    let result = Entity::delete_many().exec(&txn).await?;
    categories::Entity::update_many()
        .col_expr(categories::Column::EntryCount, Expr::value(0i64))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected)
}

pub async fn count_by_category<C: ConnectionTrait>(db: &C, category_id: &str) -> anyhow::Result<u64> {
    let count = Entity::find()
        .filter(Column::DataCategoryId.eq(category_id))
        .count(db)
        .await?;
    Ok(count)
}

pub async fn delete_by_category<C: ConnectionTrait>(db: &C, category_id: &str) -> anyhow::Result<u64> {
    let result = Entity::delete_many()
        .filter(Column::DataCategoryId.eq(category_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
