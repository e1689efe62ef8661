use axum::http::StatusCode;
use thiserror::Error;

use crate::dashboards::d100_date_graph::series_builder::SeriesError;

/// Ошибки сервисов, по которым обработчик выбирает код ответа
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// HTTP-статус для ошибки сервиса. Все, что не распознано, считается сбоем хранилища.
pub fn status_for(err: &anyhow::Error) -> StatusCode {
    if let Some(e) = err.downcast_ref::<ServiceError>() {
        return match e {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) | ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
        };
    }
    if let Some(e) = err.downcast_ref::<SeriesError>() {
        return match e {
            SeriesError::CategoryNotFound(_) => StatusCode::NOT_FOUND,
            SeriesError::NotChartable { .. }
            | SeriesError::InvalidCategoryId(_)
            | SeriesError::InvalidRange(_) => {
                StatusCode::BAD_REQUEST
            }
            SeriesError::Retrieval(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Разбор идентификатора из пути/DTO
pub fn parse_uuid(raw: &str, what: &str) -> Result<uuid::Uuid, ServiceError> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| ServiceError::BadRequest(format!("invalid {} id '{}'", what, raw)))
}
