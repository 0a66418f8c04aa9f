//! Query Analysis Engine
//!
//! Explains PromQL queries for an interactive UI:
//!
//! - **Expression Model**: typed query tree ([`Expression`])
//! - **Parser**: `promql-parser` adapter lowering into the model
//! - **AST Projector**: display tree for the UI
//! - **Plan**: synthetic execution steps (root only)
//! - **Performance**: heuristic report (root only)
//! - **Service**: format / validate / explain boundary operations
//!
//! # Pipeline
//!
//! ```text
//! query text → QueryParser::parse → Expression → analyze()
//!                                                  ├─ project      → Node
//!                                                  ├─ synthesize   → [ExecutionStep]
//!                                                  └─ analyze_performance → PerformanceReport
//! ```
//!
//! # Example
//!
//! ```rust
//! use promql_explain::explain::ExplainService;
//!
//! let service = ExplainService::new();
//! let response = service.explain("sum(rate(http_requests_total[5m])) by (job)");
//! assert!(response.success);
//!
//! let analysis = response.analysis.unwrap();
//! assert_eq!(analysis.ast.node_type, "Aggregation");
//! assert_eq!(analysis.execution.len(), 2);
//! ```

mod analyze;
mod ast;
mod error;
mod expr;
mod parser;
mod performance;
mod plan;
mod service;

pub use analyze::{analyze, Analysis};
pub use ast::{project, project_optional, Node};
pub use error::{ExplainError, ExplainResult};
pub use expr::{
    format_duration, Aggregation, AggregationModifier, BinaryOperation, Expression, FunctionCall,
    LabelFilter, MatchOperator, MetricSelector, RangeWindow, METRIC_NAME_LABEL,
};
pub use parser::{lower, PromqlParser, QueryParser};
pub use performance::{analyze_performance, Complexity, PerformanceReport};
pub use plan::{synthesize, Cost, ExecutionStep};
pub use service::{
    ExplainResponse, ExplainService, FormatResponse, Operation, ValidateResponse,
    EXAMPLE_QUERIES,
};
