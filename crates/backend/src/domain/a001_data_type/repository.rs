use chrono::Utc;
use contracts::domain::a001_data_type::aggregate::{DataType, DataTypeId, InputType};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_data_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub note: String,
    pub input_type: String,
    pub is_complex: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DataType {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let input_type = InputType::from_db(&m.input_type).unwrap_or_else(|| {
            tracing::warn!("Unknown input type '{}' for data type {}, using text", m.input_type, m.id);
            InputType::Text
        });

        DataType {
            base: BaseAggregate::with_metadata(DataTypeId(uuid), m.name, m.note, metadata),
            input_type,
            is_complex: m.is_complex,
        }
    }
}

fn conn() -> anyhow::Result<&'static DatabaseConnection> {
    get_connection()
}

fn to_active(aggregate: &DataType) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.base.id.value().to_string()),
        name: Set(aggregate.base.name.clone()),
        note: Set(aggregate.base.note.clone()),
        input_type: Set(aggregate.input_type.as_str().to_string()),
        is_complex: Set(aggregate.is_complex),
        created_at: Set(Some(aggregate.base.metadata.created_at)),
        updated_at: Set(Some(aggregate.base.metadata.updated_at)),
        version: Set(aggregate.base.metadata.version),
    }
}

pub async fn list_all() -> anyhow::Result<Vec<DataType>> {
    let items: Vec<DataType> = Entity::find()
        .order_by_asc(Column::Name)
        .all(conn()?)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<DataType>> {
    let result = Entity::find_by_id(id.to_string()).one(conn()?).await?;
    Ok(result.map(Into::into))
}

pub async fn get_by_name(name: &str) -> anyhow::Result<Option<DataType>> {
    let result = Entity::find()
        .filter(Column::Name.eq(name))
        .one(conn()?)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert(aggregate: &DataType) -> anyhow::Result<Uuid> {
    let uuid = aggregate.base.id.value();
    to_active(aggregate).insert(conn()?).await?;
    Ok(uuid)
}

pub async fn update(aggregate: &DataType) -> anyhow::Result<()> {
    let mut active = to_active(aggregate);
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn()?).await?;
    Ok(())
}

pub async fn delete(id: Uuid) -> anyhow::Result<bool> {
    let result = Entity::delete_by_id(id.to_string()).exec(conn()?).await?;
    Ok(result.rows_affected > 0)
}

/// Удалить типы, на которые не ссылается ни одна категория
pub async fn delete_unused() -> anyhow::Result<u64> {
    use sea_orm::sea_query::Query;
    use crate::domain::a002_data_category::repository as categories;

    let result = Entity::delete_many()
        .filter(
            Column::Id.not_in_subquery(
                Query::select()
                    .column(categories::Column::DataTypeId)
                    .from(categories::Entity)
                    .to_owned(),
            ),
        )
        .exec(conn()?)
        .await?;
    Ok(result.rows_affected)
}
