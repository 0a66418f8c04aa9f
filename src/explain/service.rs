//! Boundary Service
//!
//! The operations exposed to hosts (HTTP API, CLI, browser bindings):
//!
//! | operation       | success                                   | failure                   |
//! |-----------------|-------------------------------------------|---------------------------|
//! | `format`        | `{success: true, formatted}`              | `{success: false, error}` |
//! | `validate`      | `{valid: true}`                           | `{valid: false, error}`   |
//! | `list_examples` | example query strings                     |                           |
//! | `explain`       | `{success: true, ast, execution, performance}` | `{success: false, error}` |
//!
//! [`ExplainService::dispatch`] is the plain function table used by hosts
//! that receive an operation name plus raw arguments.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::explain::analyze::{analyze, Analysis};
use crate::explain::error::{ExplainError, ExplainResult};
use crate::explain::parser::{PromqlParser, QueryParser};

/// Canonical example queries, in display order
pub const EXAMPLE_QUERIES: [&str; 8] = [
    "up",
    "rate(http_requests_total[5m])",
    "sum(rate(http_requests_total[5m])) by (job)",
    "histogram_quantile(0.95, sum(rate(http_request_duration_seconds_bucket[5m])) by (le))",
    "avg_over_time(cpu_usage[1h])",
    "increase(http_requests_total{status=~\"5..\"}[1h])",
    "topk(10, sum by (instance) (rate(node_cpu_seconds_total[5m])))",
    "label_replace(up, \"instance\", \"$1\", \"instance\", \"([^:]+):.*\")",
];

/// Payload of `format`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormatResponse {
    fn ok(formatted: String) -> Self {
        Self {
            success: true,
            formatted: Some(formatted),
            error: None,
        }
    }

    fn failed(err: &ExplainError) -> Self {
        Self {
            success: false,
            formatted: None,
            error: Some(err.to_string()),
        }
    }
}

/// Payload of `validate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn failed(err: &ExplainError) -> Self {
        Self {
            valid: false,
            error: Some(err.to_string()),
        }
    }
}

/// Payload of `explain`. On failure no analysis fields are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainResponse {
    pub success: bool,
    #[serde(flatten)]
    pub analysis: Option<Analysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExplainResponse {
    fn ok(analysis: Analysis) -> Self {
        Self {
            success: true,
            analysis: Some(analysis),
            error: None,
        }
    }

    fn failed(err: &ExplainError) -> Self {
        Self {
            success: false,
            analysis: None,
            error: Some(err.to_string()),
        }
    }
}

/// Entries of the function table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Format,
    Validate,
    ListExamples,
    Explain,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Validate => "validate",
            Self::ListExamples => "list_examples",
            Self::Explain => "explain",
        }
    }

    /// Number of arguments the operation requires, `None` if it ignores them
    pub fn arity(&self) -> Option<usize> {
        match self {
            Self::ListExamples => None,
            Self::Format | Self::Validate | Self::Explain => Some(1),
        }
    }
}

impl FromStr for Operation {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "format" => Ok(Self::Format),
            "validate" => Ok(Self::Validate),
            "list_examples" => Ok(Self::ListExamples),
            "explain" => Ok(Self::Explain),
            _ => Err(ExplainError::UnknownOperation(s.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query formatting, validation and explanation
///
/// Holds no mutable state; one instance can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct ExplainService<P = PromqlParser> {
    parser: P,
}

impl ExplainService<PromqlParser> {
    /// Service backed by the PromQL parser
    pub fn new() -> Self {
        Self::with_parser(PromqlParser::new())
    }
}

impl<P: QueryParser> ExplainService<P> {
    /// Service backed by a custom parser
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// Pretty-print a query. Empty input is returned as is.
    pub fn format(&self, query: &str) -> FormatResponse {
        if query.is_empty() {
            return FormatResponse::ok(String::new());
        }

        match self.parser.prettify(query) {
            Ok(formatted) => {
                tracing::debug!(query_len = query.len(), "Formatted query");
                FormatResponse::ok(formatted)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Format failed");
                FormatResponse::failed(&e)
            }
        }
    }

    /// Check query syntax. Empty input is valid.
    pub fn validate(&self, query: &str) -> ValidateResponse {
        if query.is_empty() {
            return ValidateResponse::ok();
        }

        match self.parser.parse(query) {
            Ok(_) => ValidateResponse::ok(),
            Err(e) => {
                tracing::warn!(error = %e, "Validation failed");
                ValidateResponse::failed(&e)
            }
        }
    }

    /// Example queries for the UI
    pub fn list_examples(&self) -> Vec<String> {
        EXAMPLE_QUERIES.iter().map(|q| q.to_string()).collect()
    }

    /// Parse and analyze a query
    pub fn try_explain(&self, query: &str) -> ExplainResult<Analysis> {
        if query.is_empty() {
            return Err(ExplainError::EmptyQuery);
        }

        let expr = self.parser.parse(query)?;
        let analysis = analyze(&expr);

        tracing::debug!(
            root = expr.kind(),
            steps = analysis.execution.len(),
            complexity = ?analysis.performance.complexity,
            "Explained query"
        );

        Ok(analysis)
    }

    /// Explain a query as a boundary payload
    pub fn explain(&self, query: &str) -> ExplainResponse {
        match self.try_explain(query) {
            Ok(analysis) => ExplainResponse::ok(analysis),
            Err(e) => {
                tracing::warn!(error = %e, "Explain failed");
                ExplainResponse::failed(&e)
            }
        }
    }

    /// Invoke an operation by name with raw arguments
    ///
    /// Wrong arity and unknown names are reported in the operation's
    /// failure payload, never as a panic.
    pub fn dispatch(&self, operation: &str, args: &[String]) -> Value {
        let op = match operation.parse::<Operation>() {
            Ok(op) => op,
            Err(e) => {
                tracing::warn!(operation, "Unknown operation requested");
                return failure_payload(None, &e);
            }
        };

        match self.invoke(op, args) {
            Ok(value) => value,
            Err(e) => failure_payload(Some(op), &e),
        }
    }

    fn invoke(&self, op: Operation, args: &[String]) -> ExplainResult<Value> {
        if let Some(expected) = op.arity() {
            if args.len() != expected {
                return Err(ExplainError::Arity {
                    expected,
                    received: args.len(),
                });
            }
        }

        let value = match op {
            Operation::Format => serde_json::to_value(self.format(&args[0]))?,
            Operation::Validate => serde_json::to_value(self.validate(&args[0]))?,
            Operation::ListExamples => serde_json::to_value(self.list_examples())?,
            Operation::Explain => serde_json::to_value(self.explain(&args[0]))?,
        };
        Ok(value)
    }
}

/// Failure payload in the shape of the given operation
fn failure_payload(op: Option<Operation>, err: &ExplainError) -> Value {
    match op {
        Some(Operation::Validate) => serde_json::json!({
            "valid": false,
            "error": err.to_string(),
        }),
        _ => serde_json::json!({
            "success": false,
            "error": err.to_string(),
        }),
    }
}
