//! # promql-explain
//!
//! PromQL query explainer - formatting, validation and a didactic breakdown of
//! time-series queries for interactive UIs.
//!
//! ## Features
//!
//! - **Formatting**: pretty-printed query text
//! - **Validation**: syntax check with the parser's error message
//! - **Explanation**: structural tree, synthetic execution plan and a heuristic
//!   performance report
//! - **Hosts**: REST API, CLI and WebAssembly bindings
//!
//! ## Modules
//!
//! - [`explain`]: Query analysis engine and boundary operations
//! - `api`: REST API server with Axum (feature `server`)
//! - `config`: TOML configuration (feature `server`)
//! - `logging`: tracing subscriber setup (feature `server`)
//! - `wasm`: browser bindings (feature `wasm`)
//!
//! ## Quick Start
//!
//! ```rust
//! use promql_explain::{Complexity, ExplainService};
//!
//! let service = ExplainService::new();
//!
//! let validation = service.validate("rate(http_requests_total[5m])");
//! assert!(validation.valid);
//!
//! let response = service.explain("topk(5, cpu_usage)");
//! let analysis = response.analysis.unwrap();
//! assert_eq!(analysis.performance.complexity, Complexity::Medium);
//! ```

pub mod explain;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod logging;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export top-level types for convenience
pub use explain::{
    analyze, Analysis, Complexity, Cost, ExecutionStep, ExplainError, ExplainResponse,
    ExplainResult, ExplainService, Expression, FormatResponse, Node, Operation,
    PerformanceReport, PromqlParser, QueryParser, ValidateResponse, EXAMPLE_QUERIES,
};

#[cfg(feature = "server")]
pub use api::{build_router, serve, ApiError, AppState};

#[cfg(feature = "server")]
pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
