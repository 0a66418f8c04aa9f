//! promql-explain REST API
//!
//! HTTP host for the boundary operations, built with Axum.
//!
//! # Endpoints
//!
//! ## Query
//! - `POST /api/v1/format` - Pretty-print a query
//! - `POST /api/v1/validate` - Validate query syntax
//! - `POST /api/v1/explain` - AST, execution plan and performance report
//! - `GET /api/v1/examples` - Example queries
//! - `POST /api/v1/invoke/:operation` - Call an operation with raw arguments
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use promql_explain::api::{serve, AppState};
//! use promql_explain::config::ApiConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::default();
//!     serve(AppState::new(config)).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    let api_routes = Router::new()
        .route("/format", post(routes::query::format_query))
        .route("/validate", post(routes::query::validate_query))
        .route("/explain", post(routes::query::explain_query))
        .route("/examples", get(routes::query::list_examples))
        .route("/invoke/:operation", post(routes::query::invoke))
        .layer(DefaultBodyLimit::max(config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(shared_state)
}

/// CORS policy; permissive when no origins are configured
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("promql-explain API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("promql-explain API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        build_router(AppState::new(ApiConfig::default()))
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_examples() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/examples")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let examples: Vec<String> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(examples.len(), 8);
    }

    #[tokio::test]
    async fn test_explain_endpoint() {
        let (status, body) = post_json(create_test_app(), "/api/v1/explain", r#"{"query": "up"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["ast"], json!({"type": "MetricSelector", "value": "up"}));
        assert_eq!(body["execution"][0]["operation"], json!("data retrieval"));
        assert_eq!(body["performance"]["complexity"], json!("low"));
    }

    #[tokio::test]
    async fn test_explain_empty_query() {
        let (status, body) = post_json(create_test_app(), "/api/v1/explain", r#"{"query": ""}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "error": "Query cannot be empty"}));
    }

    #[tokio::test]
    async fn test_validate_endpoint() {
        let (_, body) = post_json(create_test_app(), "/api/v1/validate", r#"{"query": "sum("}"#).await;
        assert_eq!(body["valid"], json!(false));
        assert!(body["error"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_format_endpoint() {
        let (_, body) = post_json(create_test_app(), "/api/v1/format", r#"{"query": ""}"#).await;
        assert_eq!(body, json!({"success": true, "formatted": ""}));
    }

    #[tokio::test]
    async fn test_invoke_arity_error() {
        let (status, body) = post_json(
            create_test_app(),
            "/api/v1/invoke/explain",
            r#"{"args": ["up", "down"]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"success": false, "error": "Expected exactly one argument"})
        );
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (status, body) = post_json(create_test_app(), "/api/v1/explain", "not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    }
}
