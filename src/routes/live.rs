//! Live relay WebSocket route configuration.
//!
//! # Endpoint
//!
//! `GET /live` - WebSocket upgrade for the voice relay
//!
//! # Protocol
//!
//! After the upgrade the server sends `ready`, opens a backend session, and
//! sends `connected`. Clients then stream audio as binary frames (or base64
//! `audio` control messages) and commit turns with `end`; the server streams
//! back `audio`, `text`, `turn_complete`/`ready_for_input` pairs,
//! `interrupted` reports, and `session_id` resumption handles.
//!
//! # Example
//!
//! ```json
//! // Client commits a turn after streaming audio
//! {"type": "end"}
//!
//! // Server finishes the model turn
//! {"type": "turn_complete"}
//! {"type": "ready_for_input"}
//! ```

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::live::live_handler;
use crate::state::AppState;
use std::sync::Arc;

/// Create the live relay WebSocket router.
pub fn create_live_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/live", get(live_handler))
        .layer(TraceLayer::new_for_http())
}
