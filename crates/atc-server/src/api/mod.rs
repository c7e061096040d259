//! API routes for the analysis server.

pub mod analysis;
pub mod error;
pub mod flights;
pub mod request_id;
pub mod resolutions;
mod routes;

use crate::config::Config;
use axum::Router;

pub fn routes(config: &Config) -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router(config)
}
