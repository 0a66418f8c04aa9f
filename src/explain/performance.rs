//! Performance Heuristic Analyzer
//!
//! Rates a query by its outermost operator only. Children are never
//! inspected, so `sum(x) + rate(y[5m])` is judged purely as a binary
//! operation.

use serde::Serialize;

use crate::explain::expr::Expression;

/// Grouping label count above which an aggregation is flagged
const MAX_GROUPING_LABELS: usize = 3;

/// Overall complexity rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Heuristic performance report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub complexity: Complexity,
    pub time_range: String,
    pub cardinality: String,
    pub bottlenecks: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self {
            complexity: Complexity::Low,
            time_range: "unspecified".to_string(),
            cardinality: "unknown".to_string(),
            bottlenecks: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl PerformanceReport {
    fn bottleneck(&mut self, text: &str) {
        self.bottlenecks.push(text.to_string());
    }

    fn suggest(&mut self, text: &str) {
        self.suggestions.push(text.to_string());
    }
}

/// Analyze the root of `expr`
pub fn analyze_performance(expr: &Expression) -> PerformanceReport {
    let mut report = PerformanceReport::default();

    match expr {
        Expression::Aggregation(agg) => {
            report.complexity = Complexity::Medium;
            if agg.grouping_labels().len() > MAX_GROUPING_LABELS {
                report.bottleneck("Too many grouping labels may hurt performance");
                report.suggest("Consider reducing the number of grouping labels");
            }
        }
        Expression::Function(call) => {
            if call.name == "rate" || call.name == "increase" {
                report.suggest(
                    "Make sure the time window is large enough for an accurate rate calculation",
                );
            }
            report.complexity = Complexity::Medium;
        }
        Expression::RangeWindow(_) => {
            report.complexity = Complexity::Medium;
            report.suggest("Range queries may consume significant resources");
        }
        Expression::BinaryOperation(_) => {
            report.complexity = Complexity::High;
            report.suggest("Binary operations may require significant compute resources");
        }
        Expression::MetricSelector(_)
        | Expression::NumberLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::Unknown { .. } => {}
    }

    report
}
