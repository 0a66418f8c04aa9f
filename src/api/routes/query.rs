//! Query Routes
//!
//! Boundary operations over HTTP. Query failures are reported inside the
//! payload with status 200; only undecodable requests are API errors.
//!
//! - POST /api/v1/format - Pretty-print a query
//! - POST /api/v1/validate - Check query syntax
//! - POST /api/v1/explain - Explain a query
//! - GET /api/v1/examples - Example queries
//! - POST /api/v1/invoke/:operation - Function-table dispatch

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::{InvokeRequest, QueryRequest};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::explain::{ExplainResponse, FormatResponse, ValidateResponse};

/// POST /api/v1/format
pub async fn format_query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<FormatResponse>> {
    let Json(req) = body?;
    Ok(Json(state.service.format(&req.query)))
}

/// POST /api/v1/validate
pub async fn validate_query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<ValidateResponse>> {
    let Json(req) = body?;
    Ok(Json(state.service.validate(&req.query)))
}

/// POST /api/v1/explain
pub async fn explain_query(
    State(state): State<Arc<AppState>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> ApiResult<Json<ExplainResponse>> {
    let Json(req) = body?;
    Ok(Json(state.service.explain(&req.query)))
}

/// GET /api/v1/examples
pub async fn list_examples(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.service.list_examples())
}

/// POST /api/v1/invoke/:operation
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Path(operation): Path<String>,
    body: Result<Json<InvokeRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(req) = body?;
    tracing::debug!(operation = %operation, args = req.args.len(), "Invoking operation");
    Ok(Json(state.service.dispatch(&operation, &req.args)))
}
