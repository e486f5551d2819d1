//! Server wiring tests.
//!
//! Verifies route assembly without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use scholar_gateway::{AppState, ServerConfig, routes};

fn test_state() -> Arc<AppState> {
    Arc::new(AppState::new(ServerConfig {
        google_api_key: Some("test-key".to_string()),
        ..Default::default()
    }))
}

#[tokio::test]
async fn health_route_responds_ok() {
    let app = routes::api::create_api_router().with_state(test_state());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "scholar-gateway");
}

#[tokio::test]
async fn live_route_rejects_plain_get() {
    let app = routes::live::create_live_router().with_state(test_state());

    // Without upgrade headers the route must reject, not 404.
    let response = app
        .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = routes::api::create_api_router()
        .merge(routes::live::create_live_router())
        .with_state(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
