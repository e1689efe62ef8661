use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_data_type::aggregate::{DataType, DataTypeDto};
use serde_json::json;

use crate::domain::a001_data_type;
use crate::shared::error::{parse_uuid, status_for};

/// GET /api/data_type
pub async fn list_all() -> Result<Json<Vec<DataType>>, StatusCode> {
    match a001_data_type::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list data types: {}", e);
            Err(status_for(&e))
        }
    }
}

/// GET /api/data_type/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<DataType>, StatusCode> {
    let uuid = parse_uuid(&id, "data type").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a001_data_type::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get data type {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// POST /api/data_type
pub async fn upsert(Json(dto): Json<DataTypeDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a001_data_type::service::update(dto).await.map(|_| id),
        None => a001_data_type::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save data type: {}", e);
            Err(status_for(&e))
        }
    }
}

/// DELETE /api/data_type/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = parse_uuid(&id, "data type").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a001_data_type::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::warn!("Failed to delete data type {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// DELETE /api/data_type (debug only)
pub async fn delete_unused() -> Result<Json<serde_json::Value>, StatusCode> {
    match a001_data_type::service::delete_unused().await {
        Ok(removed) => Ok(Json(json!({"deleted": removed}))),
        Err(e) => {
            tracing::error!("Failed to delete unused data types: {}", e);
            Err(status_for(&e))
        }
    }
}
