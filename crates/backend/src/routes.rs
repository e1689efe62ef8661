use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes(debug: bool) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Data Type handlers
        .route(
            "/api/data_type",
            get(handlers::a001_data_type::list_all).post(handlers::a001_data_type::upsert),
        )
        .route(
            "/api/data_type/:id",
            get(handlers::a001_data_type::get_by_id).delete(handlers::a001_data_type::delete),
        )
        // A002 Data Category handlers
        .route(
            "/api/data_category",
            get(handlers::a002_data_category::list_all)
                .post(handlers::a002_data_category::upsert),
        )
        .route(
            "/api/data_category/:id",
            get(handlers::a002_data_category::get_by_id)
                .delete(handlers::a002_data_category::delete),
        )
        .route(
            "/api/data_category/:id/recount",
            post(handlers::a002_data_category::recount),
        )
        .route(
            "/api/data_category/:id/entries",
            get(handlers::a002_data_category::list_entries),
        )
        // A003 Data Entry handlers
        .route(
            "/api/data_entry",
            get(handlers::a003_data_entry::list_page).post(handlers::a003_data_entry::upsert),
        )
        .route(
            "/api/data_entry/:id",
            get(handlers::a003_data_entry::get_by_id).delete(handlers::a003_data_entry::delete),
        )
        .route(
            "/api/data_entry/day/:date",
            get(handlers::a003_data_entry::get_day).post(handlers::a003_data_entry::add_day_entries),
        )
        .route(
            "/api/data_entry/:id/step",
            post(handlers::a003_data_entry::step),
        )
        // D100 Date Graph Dashboard
        .route(
            "/api/d100/date-graph",
            get(handlers::d100_date_graph::get_date_graph)
                .post(handlers::d100_date_graph::post_date_graph),
        )
        .route(
            "/api/d100/date-graph/live",
            get(handlers::live::date_graph_ws),
        )
        // Change feed
        .route("/api/live", get(handlers::live::changes_ws));

    if !debug {
        return router;
    }

    tracing::warn!("Debug routes are enabled");
    router
        .route(
            "/api/data_entry/testdata",
            post(handlers::a003_data_entry::insert_test_data),
        )
        .route(
            "/api/data_entry",
            axum::routing::delete(handlers::a003_data_entry::delete_all),
        )
        .route(
            "/api/data_type",
            axum::routing::delete(handlers::a001_data_type::delete_unused),
        )
}
