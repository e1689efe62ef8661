use anyhow::Context;
use chrono::Utc;
use contracts::domain::a001_data_type::aggregate::{DataType, DataTypeId};
use contracts::domain::a002_data_category::aggregate::{
    DataCategory, DataCategoryId, DataCategoryWithType,
};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::a001_data_type;
use crate::domain::a003_data_entry::repository as entries;
use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_data_category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub note: String,
    pub default_value: String,
    pub add_default: bool,
    pub positive_increment: f64,
    pub negative_increment: f64,
    pub data_type_id: String,
    pub entry_count: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DataCategory {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let type_uuid = Uuid::parse_str(&m.data_type_id).unwrap_or_else(|_| Uuid::nil());

        DataCategory {
            base: BaseAggregate::with_metadata(DataCategoryId(uuid), m.name, m.note, metadata),
            default_value: m.default_value,
            add_default: m.add_default,
            positive_increment: m.positive_increment,
            negative_increment: m.negative_increment,
            data_type_id: DataTypeId(type_uuid),
            entry_count: m.entry_count,
        }
    }
}

fn conn() -> anyhow::Result<&'static DatabaseConnection> {
    get_connection()
}

fn to_active(aggregate: &DataCategory) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        name: Set(aggregate.base.name.clone()),
        note: Set(aggregate.base.note.clone()),
        default_value: Set(aggregate.default_value.clone()),
        add_default: Set(aggregate.add_default),
        positive_increment: Set(aggregate.positive_increment),
        negative_increment: Set(aggregate.negative_increment),
        data_type_id: Set(aggregate.data_type_id.value().to_string()),
        entry_count: Set(aggregate.entry_count),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<DataCategory>> {
    let mut items: Vec<DataCategory> = Entity::find()
        .all(conn()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    items.sort_by(|a, b| a.base.name.to_lowercase().cmp(&b.base.name.to_lowercase()));
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DataCategory>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()?).await?;
    Ok(result.map(Into::into))
}

/// Категории вместе с типами данных, по имени
pub async fn list_with_types() -> anyhow::Result<Vec<DataCategoryWithType>> {
    let types: HashMap<DataTypeId, DataType> = a001_data_type::repository::list_all()
        .await?
        .into_iter()
        .map(|t| (t.base.id, t))
        .collect();

    let items = list_all()
        .await?
        .into_iter()
        .filter_map(|category| match types.get(&category.data_type_id) {
            Some(data_type) => Some(DataCategoryWithType::new(category, data_type.clone())),
            None => {
                tracing::warn!(
                    "Category {} references missing data type {}",
                    category.base.id,
                    category.data_type_id
                );
                None
            }
        })
        .collect();
    Ok(items)
}

/// Категория с уже загруженным типом данных
pub async fn get_with_type(id: Uuid) -> anyhow::Result<Option<DataCategoryWithType>> {
    let Some(category) = get_by_id(id).await? else {
        return Ok(None);
    };
    let data_type = a001_data_type::repository::get_by_id(category.data_type_id.value())
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Category {} references missing data type {}",
                id,
                category.data_type_id
            )
        })?;
    Ok(Some(DataCategoryWithType::new(category, data_type)))
}

pub async fn insert(aggregate: &DataCategory) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate).insert(conn()?).await?;
    Ok(uuid)
}

/// Обновление полей категории. Счетчик записей не перезаписывается.
pub async fn update(aggregate: &DataCategory) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.entry_count = sea_orm::ActiveValue::NotSet;
    active.update(conn()?).await?;
    Ok(())
}

pub async fn count_by_data_type(data_type_id: Uuid) -> anyhow::Result<u64> {
    let count = Entity::find()
        .filter(Column::DataTypeId.eq(data_type_id.to_string()))
        .count(conn()?)
        .await?;
    Ok(count)
}

/// Изменить счетчик записей категории на `delta` в рамках переданного соединения/транзакции
pub async fn adjust_entry_count<C: ConnectionTrait>(
    db: &C,
    id: &str,
    delta: i64,
) -> anyhow::Result<()> {
    Entity::update_many()
        .col_expr(Column::EntryCount, Expr::col(Column::EntryCount).add(delta))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Пересчитать счетчик по таблице записей. Возвращает новое значение.
pub async fn recount(id: Uuid) -> anyhow::Result<i64> {
    let db = conn()?;
    let txn = db.begin().await?;

    let actual = entries::count_by_category(&txn, &id.to_string())
        .await
        .with_context(|| format!("count entries of category {}", id))? as i64;
    Entity::update_many()
        .col_expr(Column::EntryCount, Expr::value(actual))
        .filter(Column::Id.eq(id.to_string()))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(actual)
}

/// Удалить категорию вместе со всеми ее записями (одной транзакцией).
/// Возвращает (удалена ли категория, сколько записей удалено).
pub async fn delete_cascade(id: Uuid) -> anyhow::Result<(bool, u64)> {
    let db = conn()?;
    let txn = db.begin().await?;

    let removed_entries = entries::delete_by_category(&txn, &id.to_string())
        .await
        .with_context(|| format!("delete entries of category {}", id))?;
    let result = Entity::delete_by_id(id.to_string()).exec(&txn).await?;

    txn.commit().await?;
    Ok((result.rows_affected > 0, removed_entries))
}
