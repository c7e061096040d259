//! REST API routes.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::{analysis, flights, request_id, resolutions};
use crate::config::Config;
use crate::state::AppState;

/// Create the API router.
pub fn create_router(config: &Config) -> Router<Arc<AppState>> {
    let flight_routes = Router::new()
        .route("/v1/flights/ingest", post(flights::ingest))
        .route("/v1/flights/synthetic", get(flights::synthetic));

    let analysis_routes = Router::new()
        .route("/v1/analysis", post(analysis::run_analysis))
        .route("/v1/analysis/:analysis_id", get(analysis::get_analysis));

    let resolution_routes = Router::new()
        .route("/v1/resolutions/score", post(resolutions::score))
        .route("/v1/resolutions/apply", post(resolutions::apply));

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(flight_routes)
        .merge(analysis_routes)
        .merge(resolution_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::ensure_request_id))
        .layer(CorsLayer::permissive())
}
