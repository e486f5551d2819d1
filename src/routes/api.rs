//! Health check route configuration.

use axum::{Router, routing::get};

use crate::handlers::api::health_check;
use crate::state::AppState;
use std::sync::Arc;

/// Create the public health check router (`GET /`).
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(health_check))
}
