//! Analysis Facade
//!
//! Runs the projector, plan synthesizer and performance analyzer over the
//! same root expression and packages their output.

use serde::Serialize;

use crate::explain::ast::{project, Node};
use crate::explain::expr::Expression;
use crate::explain::performance::{analyze_performance, PerformanceReport};
use crate::explain::plan::{synthesize, ExecutionStep};

/// Combined analysis of one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub ast: Node,
    pub execution: Vec<ExecutionStep>,
    pub performance: PerformanceReport,
}

/// Analyze a parsed expression
pub fn analyze(expr: &Expression) -> Analysis {
    Analysis {
        ast: project(expr),
        execution: synthesize(expr),
        performance: analyze_performance(expr),
    }
}
