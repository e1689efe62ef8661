use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d100_date_graph::dto::{
    DateGraphQuery, DateGraphRequest, DateGraphResponse,
};

use crate::dashboards::d100_date_graph::service;
use crate::shared::error::status_for;

/// GET /api/d100/date-graph?start=2024-01-01&end=2024-01-31&categories=id1,id2&blanks=zeroize,previous
pub async fn get_date_graph(
    Query(query): Query<DateGraphQuery>,
) -> Result<Json<DateGraphResponse>, StatusCode> {
    let request = query.into_request().map_err(|e| {
        tracing::warn!("D100 Dashboard: bad query: {}", e);
        StatusCode::BAD_REQUEST
    })?;
    build(request).await
}

/// POST /api/d100/date-graph
pub async fn post_date_graph(
    Json(request): Json<DateGraphRequest>,
) -> Result<Json<DateGraphResponse>, StatusCode> {
    build(request).await
}

async fn build(request: DateGraphRequest) -> Result<Json<DateGraphResponse>, StatusCode> {
    tracing::info!(
        "D100 Dashboard: Building date graph for {} series ({:?}..{:?})",
        request.series.len(),
        request.start,
        request.end
    );

    match service::get_date_graph(request).await {
        Ok(response) => {
            tracing::info!(
                "D100 Dashboard: Returning {} labels for {} datasets",
                response.labels.len(),
                response.datasets.len()
            );
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("D100 Dashboard: Failed to build date graph: {}", e);
            Err(status_for(&e))
        }
    }
}
