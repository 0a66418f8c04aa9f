//! Expression Model
//!
//! Typed, closed representation of a parsed PromQL query. The parser adapter
//! lowers the external parser's tree into these variants; every visitor in
//! this module matches on them exhaustively.
//!
//! # Example
//!
//! ```rust
//! use promql_explain::explain::Expression;
//!
//! // sum(up) by (job)
//! let expr = Expression::aggregation("sum", vec![Expression::metric("up")])
//!     .grouped_by("by", &["job"]);
//! assert_eq!(expr.kind(), "Aggregation");
//! ```

use std::fmt;
use std::time::Duration;

/// Label name that carries the metric name of a selector
pub const METRIC_NAME_LABEL: &str = "__name__";

/// A parsed query expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Series selector such as `http_requests_total{job="api"}`
    MetricSelector(MetricSelector),
    /// Function call such as `rate(x[5m])`
    Function(FunctionCall),
    /// Aggregation operator such as `sum by (job) (x)`
    Aggregation(Aggregation),
    /// Binary operator such as `a / b`
    BinaryOperation(BinaryOperation),
    /// Evaluation over a trailing time window (`x[5m]`, subqueries, offsets)
    RangeWindow(RangeWindow),
    /// Numeric literal
    NumberLiteral(f64),
    /// String literal
    StringLiteral(String),
    /// Parser form without a mapping in this model
    Unknown { type_name: String },
}

impl Expression {
    /// Selector for a bare metric name
    pub fn metric(name: impl Into<String>) -> Self {
        Self::MetricSelector(MetricSelector::named(name))
    }

    /// Function call with ordered arguments
    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::Function(FunctionCall {
            name: name.into(),
            args,
        })
    }

    /// Aggregation without a grouping modifier
    pub fn aggregation(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::Aggregation(Aggregation {
            name: name.into(),
            args,
            modifier: None,
        })
    }

    /// Binary operation; operand order is preserved
    pub fn binary(op: impl Into<String>, left: Expression, right: Expression) -> Self {
        Self::BinaryOperation(BinaryOperation {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// Range window around an inner expression
    pub fn range(inner: Expression, window: Duration) -> Self {
        Self::RangeWindow(RangeWindow {
            inner: Some(Box::new(inner)),
            window: Some(window),
        })
    }

    /// Attach a grouping modifier. Has no effect on non-aggregations.
    pub fn grouped_by(mut self, op: impl Into<String>, labels: &[&str]) -> Self {
        if let Self::Aggregation(ref mut agg) = self {
            agg.modifier = Some(AggregationModifier {
                op: op.into(),
                grouping_labels: labels.iter().map(|l| l.to_string()).collect(),
            });
        }
        self
    }

    /// Variant name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MetricSelector(_) => "MetricSelector",
            Self::Function(_) => "Function",
            Self::Aggregation(_) => "Aggregation",
            Self::BinaryOperation(_) => "BinaryOperation",
            Self::RangeWindow(_) => "RangeWindow",
            Self::NumberLiteral(_) => "NumberLiteral",
            Self::StringLiteral(_) => "StringLiteral",
            Self::Unknown { .. } => "Unknown",
        }
    }
}

/// Label matching operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `=~`
    RegexMatch,
    /// `!~`
    RegexNoMatch,
}

impl MatchOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::RegexMatch => "=~",
            Self::RegexNoMatch => "!~",
        }
    }
}

impl fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `label<op>value` filter of a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    pub label: String,
    pub op: MatchOperator,
    pub value: String,
}

impl LabelFilter {
    pub fn new(label: impl Into<String>, op: MatchOperator, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            op,
            value: value.into(),
        }
    }

    /// The `__name__="<metric>"` filter
    pub fn metric_name(name: impl Into<String>) -> Self {
        Self::new(METRIC_NAME_LABEL, MatchOperator::Equal, name)
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.label, self.op, self.value)
    }
}

/// Series selector. The metric name, when present, is the first filter.
///
/// `alternatives` holds the groups of an `or` selector
/// (`up{job="a" or job="b"}`); a series matches when it satisfies
/// `filters` and at least one group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricSelector {
    pub filters: Vec<LabelFilter>,
    pub alternatives: Vec<Vec<LabelFilter>>,
}

impl MetricSelector {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            filters: vec![LabelFilter::metric_name(name)],
            alternatives: Vec::new(),
        }
    }

    /// Add a label filter after the existing ones
    pub fn with_filter(mut self, filter: LabelFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an `or` group
    pub fn with_alternative(mut self, group: Vec<LabelFilter>) -> Self {
        self.alternatives.push(group);
        self
    }

    /// Value of the leading filter, which carries the metric name by convention
    pub fn metric_name(&self) -> Option<&str> {
        self.filters.first().map(|f| f.value.as_str())
    }
}

/// Function call
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expression>,
}

/// Aggregation operator application
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub name: String,
    pub args: Vec<Expression>,
    pub modifier: Option<AggregationModifier>,
}

impl Aggregation {
    /// Grouping labels, empty when there is no modifier
    pub fn grouping_labels(&self) -> &[String] {
        self.modifier
            .as_ref()
            .map(|m| m.grouping_labels.as_slice())
            .unwrap_or(&[])
    }
}

/// `by (...)` / `without (...)` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationModifier {
    pub op: String,
    pub grouping_labels: Vec<String>,
}

/// Binary operation
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub op: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

/// Wrapper for evaluation over a time window
#[derive(Debug, Clone, PartialEq)]
pub struct RangeWindow {
    pub inner: Option<Box<Expression>>,
    pub window: Option<Duration>,
}

/// Render a duration the way PromQL writes it (`5m`, `1h30m`, `250ms`)
pub fn format_duration(duration: Duration) -> String {
    const UNITS: [(&str, u128); 7] = [
        ("y", 365 * 24 * 60 * 60 * 1000),
        ("w", 7 * 24 * 60 * 60 * 1000),
        ("d", 24 * 60 * 60 * 1000),
        ("h", 60 * 60 * 1000),
        ("m", 60 * 1000),
        ("s", 1000),
        ("ms", 1),
    ];

    let mut remaining = duration.as_millis();
    if remaining == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, millis) in UNITS {
        let count = remaining / millis;
        if count > 0 {
            out.push_str(&count.to_string());
            out.push_str(unit);
            remaining %= millis;
        }
    }
    out
}
