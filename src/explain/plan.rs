//! Execution-Plan Synthesizer
//!
//! Produces an illustrative, human-readable plan for a query. Only the root
//! expression is inspected: `sum(rate(x[5m]))` is described as an
//! aggregation, without steps for `rate` or the selector.

use serde::Serialize;

use crate::explain::expr::Expression;

/// Placeholder for a selector that names no metric
const UNKNOWN_METRIC: &str = "unknown_metric";

/// Relative cost of a plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cost {
    Low,
    Medium,
    High,
}

/// A single step of the synthetic execution plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStep {
    /// 1-based position in the plan
    pub step: usize,
    pub operation: String,
    pub description: String,
    pub cost: Cost,
}

/// Accumulates steps and numbers them in emission order
struct PlanBuilder {
    steps: Vec<ExecutionStep>,
}

impl PlanBuilder {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn push(&mut self, operation: &str, description: String, cost: Cost) {
        let step = self.steps.len() + 1;
        self.steps.push(ExecutionStep {
            step,
            operation: operation.to_string(),
            description,
            cost,
        });
    }

    fn finish(self) -> Vec<ExecutionStep> {
        self.steps
    }
}

/// Synthesize the execution plan for the root of `expr`
pub fn synthesize(expr: &Expression) -> Vec<ExecutionStep> {
    let mut plan = PlanBuilder::new();

    match expr {
        Expression::MetricSelector(selector) => {
            let metric = selector.metric_name().unwrap_or(UNKNOWN_METRIC);
            plan.push(
                "data retrieval",
                format!("Retrieve metric {} from the time-series database", metric),
                Cost::Low,
            );
        }
        Expression::Function(call) => {
            plan.push(
                "function evaluation",
                format!("Evaluate function {}", call.name),
                Cost::Medium,
            );
        }
        Expression::Aggregation(agg) => {
            plan.push(
                "aggregation",
                format!("Perform {} aggregation", agg.name),
                Cost::High,
            );
            let labels = agg.grouping_labels();
            if !labels.is_empty() {
                plan.push(
                    "grouping",
                    format!("Group by labels: {}", labels.join(", ")),
                    Cost::Medium,
                );
            }
        }
        Expression::RangeWindow(_) => {
            plan.push(
                "range query",
                "Evaluate the query over a time range".to_string(),
                Cost::Medium,
            );
        }
        // No steps are defined for these roots
        Expression::BinaryOperation(_)
        | Expression::NumberLiteral(_)
        | Expression::StringLiteral(_)
        | Expression::Unknown { .. } => {}
    }

    plan.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::expr::MetricSelector;
    use std::time::Duration;

    fn assert_contiguous(steps: &[ExecutionStep]) {
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.step, i + 1);
        }
    }

    #[test]
    fn test_selector_plan() {
        let steps = synthesize(&Expression::metric("up"));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step, 1);
        assert_eq!(steps[0].operation, "data retrieval");
        assert_eq!(steps[0].cost, Cost::Low);
        assert!(steps[0].description.contains("up"));
    }

    #[test]
    fn test_selector_without_filters() {
        let steps = synthesize(&Expression::MetricSelector(MetricSelector::default()));
        assert!(steps[0].description.contains("unknown_metric"));
    }

    #[test]
    fn test_function_plan() {
        let steps = synthesize(&Expression::function("rate", vec![]));
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].operation, "function evaluation");
        assert_eq!(steps[0].cost, Cost::Medium);
        assert!(steps[0].description.contains("rate"));
    }

    #[test]
    fn test_aggregation_with_grouping() {
        let expr = Expression::aggregation("sum", vec![Expression::metric("up")])
            .grouped_by("by", &["job", "instance"]);
        let steps = synthesize(&expr);

        assert_eq!(steps.len(), 2);
        assert_contiguous(&steps);
        assert_eq!(steps[0].operation, "aggregation");
        assert_eq!(steps[0].cost, Cost::High);
        assert!(steps[0].description.contains("sum"));
        assert_eq!(steps[1].operation, "grouping");
        assert_eq!(steps[1].cost, Cost::Medium);
        assert!(steps[1].description.ends_with("job, instance"));
    }

    #[test]
    fn test_aggregation_without_grouping() {
        let steps = synthesize(&Expression::aggregation("count", vec![]));
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_range_window_plan() {
        let expr = Expression::range(Expression::metric("x"), Duration::from_secs(60));
        let steps = synthesize(&expr);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].operation, "range query");
        assert_eq!(steps[0].cost, Cost::Medium);
    }

    #[test]
    fn test_root_only() {
        // sum(rate(x[5m])) describes only the aggregation
        let expr = Expression::aggregation(
            "sum",
            vec![Expression::function(
                "rate",
                vec![Expression::range(Expression::metric("x"), Duration::from_secs(300))],
            )],
        );
        let steps = synthesize(&expr);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].operation, "aggregation");
    }

    #[test]
    fn test_binary_and_literals_have_no_steps() {
        let binary = Expression::binary(
            "+",
            Expression::aggregation("sum", vec![]).grouped_by("by", &["a"]),
            Expression::function("rate", vec![]),
        );
        assert!(synthesize(&binary).is_empty());
        assert!(synthesize(&Expression::NumberLiteral(1.0)).is_empty());
        assert!(synthesize(&Expression::StringLiteral("a".into())).is_empty());
        assert!(synthesize(&Expression::Unknown {
            type_name: "X".into()
        })
        .is_empty());
    }

    #[test]
    fn test_cost_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Cost::High).unwrap(), "\"high\"");
    }
}
