use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a002_data_category::aggregate::{DataCategoryDto, DataCategoryWithType};
use contracts::domain::a003_data_entry::aggregate::DataEntry;
use serde_json::json;

use crate::domain::a002_data_category;
use crate::shared::error::{parse_uuid, status_for};

/// GET /api/data_category
pub async fn list_all() -> Result<Json<Vec<DataCategoryWithType>>, StatusCode> {
    match a002_data_category::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list data categories: {}", e);
            Err(status_for(&e))
        }
    }
}

/// GET /api/data_category/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<DataCategoryWithType>, StatusCode> {
    let uuid = parse_uuid(&id, "data category").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_data_category::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get data category {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// POST /api/data_category
pub async fn upsert(
    Json(dto): Json<DataCategoryDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a002_data_category::service::update(dto).await.map(|_| id),
        None => a002_data_category::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save data category: {}", e);
            Err(status_for(&e))
        }
    }
}

/// DELETE /api/data_category/:id (вместе с записями)
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = parse_uuid(&id, "data category").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_data_category::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete data category {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// POST /api/data_category/:id/recount
pub async fn recount(Path(id): Path<String>) -> Result<Json<serde_json::Value>, StatusCode> {
    let uuid = parse_uuid(&id, "data category").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_data_category::service::recount(uuid).await {
        Ok(count) => Ok(Json(json!({"id": id, "entryCount": count}))),
        Err(e) => {
            tracing::error!("Failed to recount data category {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// GET /api/data_category/:id/entries
pub async fn list_entries(Path(id): Path<String>) -> Result<Json<Vec<DataEntry>>, StatusCode> {
    let uuid = parse_uuid(&id, "data category").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a002_data_category::service::list_entries(uuid).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list entries of category {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}
