//! AST Projector
//!
//! Converts an [`Expression`] into the display-oriented [`Node`] tree shown
//! by the query explanation UI. The projection is structural: one node per
//! expression, children in source order. Recursion depth equals the nesting
//! depth of the expression.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::explain::expr::*;

/// Placeholder value for a selector without any filter
const UNNAMED_METRIC: &str = "metric";

/// Display AST node
///
/// Absent optional fields are omitted from the JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Value>>,
}

impl Node {
    fn new(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            value: None,
            children: Vec::new(),
            properties: None,
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Node for absent input
    pub fn null() -> Self {
        Self::new("null")
    }

    /// Property lookup
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }
}

/// Project an optional expression; `None` yields a `null` node
pub fn project_optional(expr: Option<&Expression>) -> Node {
    match expr {
        Some(expr) => project(expr),
        None => Node::null(),
    }
}

/// Project an expression into its display tree
pub fn project(expr: &Expression) -> Node {
    match expr {
        Expression::MetricSelector(selector) => project_selector(selector),

        Expression::Function(call) => Node::new("Function")
            .with_value(call.name.as_str())
            .with_children(call.args.iter().map(project).collect()),

        Expression::Aggregation(agg) => {
            let mut node = Node::new("Aggregation")
                .with_value(agg.name.as_str())
                .with_children(agg.args.iter().map(project).collect());
            if let Some(modifier) = &agg.modifier {
                if !modifier.grouping_labels.is_empty() {
                    node = node
                        .with_property("grouping", modifier.grouping_labels.clone())
                        .with_property("modifier", modifier.op.as_str());
                }
            }
            node
        }

        Expression::BinaryOperation(bin) => Node::new("BinaryOperation")
            .with_value(bin.op.as_str())
            .with_children(vec![project(&bin.left), project(&bin.right)]),

        Expression::RangeWindow(rw) => {
            let mut node = Node::new("Rollup").with_value("range_query");
            if let Some(inner) = &rw.inner {
                node = node.with_children(vec![project(inner)]);
            }
            if let Some(window) = rw.window {
                node = node.with_property("window", format_duration(window));
            }
            node
        }

        Expression::NumberLiteral(n) => Node::new("Number").with_value(format_number(*n)),

        Expression::StringLiteral(s) => Node::new("String").with_value(s.as_str()),

        Expression::Unknown { type_name } => Node::new("Unknown").with_value(type_name.as_str()),
    }
}

fn project_selector(selector: &MetricSelector) -> Node {
    let name = selector.metric_name().unwrap_or(UNNAMED_METRIC);
    let mut node = Node::new("MetricSelector").with_value(name);

    if selector.filters.len() > 1 {
        let filters: Vec<String> = selector.filters[1..]
            .iter()
            .map(|f| f.to_string())
            .collect();
        node = node.with_property("filters", filters);
    }

    if !selector.alternatives.is_empty() {
        let groups: Vec<Vec<String>> = selector
            .alternatives
            .iter()
            .map(|group| group.iter().map(|f| f.to_string()).collect())
            .collect();
        node = node.with_property("alternatives", groups);
    }

    node
}

/// Magnitudes outside this range are written in exponent form
const PLAIN_DECIMAL_MIN: f64 = 1e-6;
const PLAIN_DECIMAL_MAX: f64 = 1e21;

/// Shortest round-trip decimal; non-finite values use PromQL spelling
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "+Inf".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if n != 0.0 && (n.abs() < PLAIN_DECIMAL_MIN || n.abs() >= PLAIN_DECIMAL_MAX) {
        format!("{:e}", n)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_project_bare_selector() {
        let node = project(&Expression::metric("up"));
        assert_eq!(node.node_type, "MetricSelector");
        assert_eq!(node.value.as_deref(), Some("up"));
        assert!(node.children.is_empty());
        assert!(node.properties.is_none());
    }

    #[test]
    fn test_project_selector_filters() {
        let selector = MetricSelector::named("http_requests_total")
            .with_filter(LabelFilter::new("job", MatchOperator::Equal, "api"))
            .with_filter(LabelFilter::new("code", MatchOperator::RegexNoMatch, "2.."));
        let node = project(&Expression::MetricSelector(selector));

        assert_eq!(node.value.as_deref(), Some("http_requests_total"));
        assert_eq!(node.property("filters"), Some(&json!(["job=api", "code!~2.."])));
    }

    #[test]
    fn test_project_selector_alternatives() {
        let selector = MetricSelector::named("up")
            .with_alternative(vec![LabelFilter::new("job", MatchOperator::Equal, "a")])
            .with_alternative(vec![
                LabelFilter::new("job", MatchOperator::Equal, "b"),
                LabelFilter::new("env", MatchOperator::NotEqual, "dev"),
            ]);
        let node = project(&Expression::MetricSelector(selector));

        assert_eq!(node.value.as_deref(), Some("up"));
        assert!(node.property("filters").is_none());
        assert_eq!(
            node.property("alternatives"),
            Some(&json!([["job=a"], ["job=b", "env!=dev"]]))
        );
    }

    #[test]
    fn test_project_empty_selector_uses_placeholder() {
        let node = project(&Expression::MetricSelector(MetricSelector::default()));
        assert_eq!(node.value.as_deref(), Some("metric"));
    }

    #[test]
    fn test_project_function_children_in_order() {
        let a = Expression::NumberLiteral(0.95);
        let b = Expression::metric("latency_bucket");
        let node = project(&Expression::function("f", vec![a.clone(), b.clone()]));

        assert_eq!(node.node_type, "Function");
        assert_eq!(node.value.as_deref(), Some("f"));
        assert_eq!(node.children, vec![project(&a), project(&b)]);
    }

    #[test]
    fn test_project_aggregation_grouping() {
        let expr = Expression::aggregation("sum", vec![Expression::metric("up")])
            .grouped_by("by", &["job", "instance"]);
        let node = project(&expr);

        assert_eq!(node.value.as_deref(), Some("sum"));
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.property("grouping"), Some(&json!(["job", "instance"])));
        assert_eq!(node.property("modifier"), Some(&json!("by")));
    }

    #[test]
    fn test_project_aggregation_without_labels_has_no_properties() {
        let expr = Expression::aggregation("sum", vec![Expression::metric("up")])
            .grouped_by("by", &[]);
        assert!(project(&expr).properties.is_none());
    }

    #[test]
    fn test_project_binary_left_then_right() {
        let expr = Expression::binary(
            "-",
            Expression::metric("a"),
            Expression::metric("b"),
        );
        let node = project(&expr);
        assert_eq!(node.value.as_deref(), Some("-"));
        assert_eq!(node.children[0].value.as_deref(), Some("a"));
        assert_eq!(node.children[1].value.as_deref(), Some("b"));
    }

    #[test]
    fn test_project_range_window() {
        let expr = Expression::range(Expression::metric("cpu_usage"), Duration::from_secs(3600));
        let node = project(&expr);
        assert_eq!(node.node_type, "Rollup");
        assert_eq!(node.value.as_deref(), Some("range_query"));
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.property("window"), Some(&json!("1h")));

        let bare = project(&Expression::RangeWindow(RangeWindow {
            inner: None,
            window: None,
        }));
        assert!(bare.children.is_empty());
        assert!(bare.properties.is_none());
    }

    #[test]
    fn test_project_numbers() {
        let value = |n: f64| project(&Expression::NumberLiteral(n)).value.unwrap();
        assert_eq!(value(0.95), "0.95");
        assert_eq!(value(10.0), "10");
        assert_eq!(value(f64::NAN), "NaN");
        assert_eq!(value(f64::INFINITY), "+Inf");
        assert_eq!(value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(value(0.0), "0");
        assert_eq!(value(1e300), "1e300");
        assert_eq!(value(-2.5e21), "-2.5e21");
        assert_eq!(value(1e-10), "1e-10");
        assert_eq!(value(0.000001), "0.000001");
    }

    #[test]
    fn test_project_string_verbatim() {
        let node = project(&Expression::StringLiteral("([^:]+):.*".to_string()));
        assert_eq!(node.node_type, "String");
        assert_eq!(node.value.as_deref(), Some("([^:]+):.*"));
    }

    #[test]
    fn test_project_unknown_and_null() {
        let node = project(&Expression::Unknown {
            type_name: "DurationExpr".to_string(),
        });
        assert_eq!(node.node_type, "Unknown");
        assert_eq!(node.value.as_deref(), Some("DurationExpr"));

        let null = project_optional(None);
        assert_eq!(serde_json::to_value(&null).unwrap(), json!({"type": "null"}));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let node = project(&Expression::metric("up"));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "MetricSelector", "value": "up"})
        );
    }

    #[test]
    fn test_project_is_pure() {
        let expr = Expression::aggregation(
            "sum",
            vec![Expression::range(Expression::metric("x"), Duration::from_secs(300))],
        )
        .grouped_by("by", &["job"]);
        let first = serde_json::to_string(&project(&expr)).unwrap();
        let second = serde_json::to_string(&project(&expr)).unwrap();
        assert_eq!(first, second);
    }
}
