pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::state::AppState;
use crate::storage::handlers as results;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis API
        .route("/api/v1/analyze", post(analysis::handle_analyze))
        .route("/api/v1/analyze/text", post(analysis::handle_analyze_text))
        .route("/api/v1/analyze/bulk", post(analysis::handle_analyze_bulk))
        // Results API
        .route(
            "/api/v1/results",
            get(results::handle_list_results).delete(results::handle_clear_results),
        )
        .route(
            "/api/v1/results/export",
            get(results::handle_export_results),
        )
        .route(
            "/api/v1/results/import",
            post(results::handle_import_results),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
