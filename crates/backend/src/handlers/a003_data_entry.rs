use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use contracts::domain::a003_data_entry::aggregate::{
    AddDayEntriesRequest, DataEntry, DataEntryDto, DataEntryPage, DaySummary, StepEntryRequest,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a003_data_entry;
use crate::shared::config;
use crate::shared::error::{parse_uuid, status_for};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub next_token: Option<String>,
}

/// GET /api/data_entry?limit=20&next_token=...
pub async fn list_page(Query(query): Query<PageQuery>) -> Result<Json<DataEntryPage>, StatusCode> {
    let page_size = config::settings().entries.page_size;
    match a003_data_entry::service::list_page(query.limit, query.next_token.as_deref(), page_size)
        .await
    {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            tracing::error!("Failed to list data entries: {}", e);
            Err(status_for(&e))
        }
    }
}

/// GET /api/data_entry/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<DataEntry>, StatusCode> {
    let uuid = parse_uuid(&id, "data entry").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a003_data_entry::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get data entry {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// POST /api/data_entry
pub async fn upsert(Json(dto): Json<DataEntryDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    let result = match dto.id.clone() {
        Some(id) => a003_data_entry::service::update(dto).await.map(|_| id),
        None => a003_data_entry::service::create(dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({"id": id}))),
        Err(e) => {
            tracing::error!("Failed to save data entry: {}", e);
            Err(status_for(&e))
        }
    }
}

/// DELETE /api/data_entry/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    let uuid = parse_uuid(&id, "data entry").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a003_data_entry::service::delete(uuid).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to delete data entry {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// GET /api/data_entry/day/:date
pub async fn get_day(Path(date): Path<NaiveDate>) -> Result<Json<DaySummary>, StatusCode> {
    match a003_data_entry::service::day_summary(date).await {
        Ok(summary) => Ok(Json(summary)),
        Err(e) => {
            tracing::error!("Failed to load day {}: {}", date, e);
            Err(status_for(&e))
        }
    }
}

/// POST /api/data_entry/day/:date
pub async fn add_day_entries(
    Path(date): Path<NaiveDate>,
    Json(request): Json<AddDayEntriesRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match a003_data_entry::service::add_day_entries(date, &request.category_ids).await {
        Ok(ids) => {
            let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            Ok(Json(json!({"ids": ids})))
        }
        Err(e) => {
            tracing::error!("Failed to add entries for {}: {}", date, e);
            Err(status_for(&e))
        }
    }
}

/// POST /api/data_entry/:id/step
pub async fn step(
    Path(id): Path<String>,
    Json(request): Json<StepEntryRequest>,
) -> Result<Json<DataEntry>, StatusCode> {
    let uuid = parse_uuid(&id, "data entry").map_err(|_| StatusCode::BAD_REQUEST)?;
    match a003_data_entry::service::step(uuid, request.direction).await {
        Ok(entry) => Ok(Json(entry)),
        Err(e) => {
            tracing::warn!("Failed to step data entry {}: {}", id, e);
            Err(status_for(&e))
        }
    }
}

/// POST /api/data_entry/testdata (debug only)
pub async fn insert_test_data() -> Result<Json<serde_json::Value>, StatusCode> {
    match a003_data_entry::service::insert_test_data().await {
        Ok(inserted) => Ok(Json(json!({"inserted": inserted}))),
        Err(e) => {
            tracing::error!("Failed to insert test entries: {}", e);
            Err(status_for(&e))
        }
    }
}

/// DELETE /api/data_entry (debug only)
pub async fn delete_all() -> Result<Json<serde_json::Value>, StatusCode> {
    match a003_data_entry::service::delete_all().await {
        Ok(removed) => Ok(Json(json!({"deleted": removed}))),
        Err(e) => {
            tracing::error!("Failed to delete all entries: {}", e);
            Err(status_for(&e))
        }
    }
}
