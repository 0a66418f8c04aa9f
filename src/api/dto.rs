//! Data Transfer Objects
//!
//! Request and response types for the API endpoints that are not boundary
//! payloads themselves. Boundary payloads are defined next to the service.

use serde::{Deserialize, Serialize};

/// Body of `/format`, `/validate` and `/explain`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// Query text
    pub query: String,
}

/// Body of `/invoke/:operation`
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    /// Raw operation arguments
    #[serde(default)]
    pub args: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
}
