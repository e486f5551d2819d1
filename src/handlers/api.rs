//! Health check handler.

use axum::Json;
use serde_json::{Value, json};

/// Report service liveness.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
