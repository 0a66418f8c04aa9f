//! Parser Adapter
//!
//! Parsing and pretty-printing are delegated to the `promql-parser` crate.
//! This module hides it behind [`QueryParser`] and lowers its syntax tree into
//! the [`Expression`] model.
//!
//! # Lowering
//!
//! ```text
//! VectorSelector            → MetricSelector (wrapped in RangeWindow if offset/@ is set)
//! MatrixSelector, Subquery  → RangeWindow { inner, window }
//! Call                      → Function
//! Aggregate                 → Aggregation (param first, then the aggregated expression)
//! Binary                    → BinaryOperation
//! Unary (-x)                → BinaryOperation { 0 - x }
//! Paren                     → inner expression
//! Extension                 → Unknown
//! ```

use promql_parser::label::{MatchOp, Matcher};
use promql_parser::parser::{self, AggregateExpr, Expr, LabelModifier, VectorSelector};

use crate::explain::error::{ExplainError, ExplainResult};
use crate::explain::expr::*;

/// Parsing and formatting collaborator
pub trait QueryParser: Send + Sync {
    /// Parse query text into the expression model
    fn parse(&self, query: &str) -> ExplainResult<Expression>;

    /// Pretty-print query text
    fn prettify(&self, query: &str) -> ExplainResult<String>;
}

/// [`QueryParser`] backed by `promql-parser`
#[derive(Debug, Clone, Copy, Default)]
pub struct PromqlParser;

impl PromqlParser {
    pub fn new() -> Self {
        Self
    }
}

impl QueryParser for PromqlParser {
    fn parse(&self, query: &str) -> ExplainResult<Expression> {
        let expr = parser::parse(query).map_err(ExplainError::Parse)?;
        Ok(lower(&expr))
    }

    fn prettify(&self, query: &str) -> ExplainResult<String> {
        let expr = parser::parse(query).map_err(ExplainError::Parse)?;
        Ok(expr.prettify())
    }
}

/// Convert a `promql-parser` expression into the expression model
pub fn lower(expr: &Expr) -> Expression {
    match expr {
        Expr::VectorSelector(vs) => {
            let selector = Expression::MetricSelector(lower_selector(vs));
            if vs.offset.is_some() || vs.at.is_some() {
                Expression::RangeWindow(RangeWindow {
                    inner: Some(Box::new(selector)),
                    window: None,
                })
            } else {
                selector
            }
        }
        Expr::MatrixSelector(ms) => Expression::RangeWindow(RangeWindow {
            inner: Some(Box::new(Expression::MetricSelector(lower_selector(&ms.vs)))),
            window: Some(ms.range),
        }),
        Expr::Subquery(sq) => Expression::RangeWindow(RangeWindow {
            inner: Some(Box::new(lower(&sq.expr))),
            window: Some(sq.range),
        }),
        Expr::Call(call) => Expression::Function(FunctionCall {
            name: call.func.name.to_string(),
            args: call.args.args.iter().map(|arg| lower(arg)).collect(),
        }),
        Expr::Aggregate(agg) => Expression::Aggregation(lower_aggregate(agg)),
        Expr::Binary(bin) => Expression::BinaryOperation(BinaryOperation {
            op: bin.op.to_string(),
            left: Box::new(lower(&bin.lhs)),
            right: Box::new(lower(&bin.rhs)),
        }),
        // Negation is a subtraction from zero
        Expr::Unary(unary) => Expression::BinaryOperation(BinaryOperation {
            op: "-".to_string(),
            left: Box::new(Expression::NumberLiteral(0.0)),
            right: Box::new(lower(&unary.expr)),
        }),
        Expr::Paren(paren) => lower(&paren.expr),
        Expr::NumberLiteral(num) => Expression::NumberLiteral(num.val),
        Expr::StringLiteral(s) => Expression::StringLiteral(s.val.clone()),
        Expr::Extension(ext) => Expression::Unknown {
            type_name: std::any::type_name_of_val(ext).to_string(),
        },
    }
}

fn lower_selector(vs: &VectorSelector) -> MetricSelector {
    let mut filters = Vec::with_capacity(vs.matchers.matchers.len() + 1);

    if let Some(name) = &vs.name {
        filters.push(LabelFilter::metric_name(name.clone()));
    }
    filters.extend(lower_matchers(vs, &vs.matchers.matchers));

    let alternatives = vs
        .matchers
        .or_matchers
        .iter()
        .map(|group| lower_matchers(vs, group))
        .filter(|group| !group.is_empty())
        .collect();

    MetricSelector {
        filters,
        alternatives,
    }
}

/// Lower matchers in source order, skipping a `__name__` matcher that repeats the metric name
fn lower_matchers(vs: &VectorSelector, matchers: &[Matcher]) -> Vec<LabelFilter> {
    matchers
        .iter()
        .filter(|m| {
            !(m.name == METRIC_NAME_LABEL
                && matches!(m.op, MatchOp::Equal)
                && vs.name.as_deref() == Some(m.value.as_str()))
        })
        .map(lower_matcher)
        .collect()
}

fn lower_matcher(matcher: &Matcher) -> LabelFilter {
    let op = match &matcher.op {
        MatchOp::Equal => MatchOperator::Equal,
        MatchOp::NotEqual => MatchOperator::NotEqual,
        MatchOp::Re(_) => MatchOperator::RegexMatch,
        MatchOp::NotRe(_) => MatchOperator::RegexNoMatch,
    };
    LabelFilter::new(matcher.name.clone(), op, matcher.value.clone())
}

fn lower_aggregate(agg: &AggregateExpr) -> Aggregation {
    let mut args = Vec::with_capacity(2);
    if let Some(param) = &agg.param {
        args.push(lower(param));
    }
    args.push(lower(&agg.expr));

    let modifier = agg.modifier.as_ref().map(|m| match m {
        LabelModifier::Include(labels) => AggregationModifier {
            op: "by".to_string(),
            grouping_labels: labels.labels.clone(),
        },
        LabelModifier::Exclude(labels) => AggregationModifier {
            op: "without".to_string(),
            grouping_labels: labels.labels.clone(),
        },
    });

    Aggregation {
        name: agg.op.to_string(),
        args,
        modifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(query: &str) -> Expression {
        PromqlParser::new().parse(query).unwrap()
    }

    #[test]
    fn test_parse_bare_metric() {
        assert_eq!(parse("up"), Expression::metric("up"));
    }

    #[test]
    fn test_parse_selector_filters_keep_source_order() {
        match parse(r#"http_requests_total{method!="GET", status=~"5.."}"#) {
            Expression::MetricSelector(sel) => {
                assert_eq!(sel.metric_name(), Some("http_requests_total"));
                assert_eq!(sel.filters.len(), 3);
                assert_eq!(sel.filters[1].to_string(), "method!=GET");
                assert_eq!(sel.filters[2].to_string(), "status=~5..");
            }
            other => panic!("expected selector, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_or_selector_keeps_every_group() {
        let expected = MetricSelector::named("up")
            .with_alternative(vec![LabelFilter::new("job", MatchOperator::Equal, "a")])
            .with_alternative(vec![LabelFilter::new("job", MatchOperator::Equal, "b")]);

        assert_eq!(
            parse(r#"up{job="a" or job="b"}"#),
            Expression::MetricSelector(expected)
        );
    }

    #[test]
    fn test_parse_matrix_selector() {
        let expected = Expression::range(
            Expression::metric("http_requests_total"),
            Duration::from_secs(300),
        );
        assert_eq!(parse("http_requests_total[5m]"), expected);
    }

    #[test]
    fn test_parse_offset_wraps_selector() {
        match parse("up offset 5m") {
            Expression::RangeWindow(rw) => {
                assert!(rw.window.is_none());
                assert_eq!(rw.inner.as_deref(), Some(&Expression::metric("up")));
            }
            other => panic!("expected range window, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_function() {
        match parse("rate(http_requests_total[5m])") {
            Expression::Function(call) => {
                assert_eq!(call.name, "rate");
                assert_eq!(call.args.len(), 1);
                assert!(matches!(call.args[0], Expression::RangeWindow(_)));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_aggregation_with_param_and_grouping() {
        match parse("topk(10, sum by (instance) (rate(node_cpu_seconds_total[5m])))") {
            Expression::Aggregation(agg) => {
                assert_eq!(agg.name, "topk");
                assert_eq!(agg.args.len(), 2);
                assert_eq!(agg.args[0], Expression::NumberLiteral(10.0));
                assert!(agg.modifier.is_none());
                match &agg.args[1] {
                    Expression::Aggregation(inner) => {
                        assert_eq!(inner.name, "sum");
                        assert_eq!(inner.grouping_labels(), ["instance"]);
                        assert_eq!(inner.modifier.as_ref().unwrap().op, "by");
                    }
                    other => panic!("expected inner aggregation, got {:?}", other),
                }
            }
            other => panic!("expected aggregation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_without_modifier() {
        match parse("sum without (instance) (up)") {
            Expression::Aggregation(agg) => {
                let modifier = agg.modifier.unwrap();
                assert_eq!(modifier.op, "without");
                assert_eq!(modifier.grouping_labels, vec!["instance".to_string()]);
            }
            other => panic!("expected aggregation, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_binary_keeps_operand_order() {
        let expected = Expression::binary(
            "/",
            Expression::metric("errors"),
            Expression::metric("requests"),
        );
        assert_eq!(parse("errors / requests"), expected);
    }

    #[test]
    fn test_parse_paren_is_transparent() {
        assert_eq!(parse("(up)"), Expression::metric("up"));
    }

    #[test]
    fn test_parse_unary_minus() {
        let expected = Expression::binary(
            "-",
            Expression::NumberLiteral(0.0),
            Expression::metric("up"),
        );
        assert_eq!(parse("-up"), expected);
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse("1.5"), Expression::NumberLiteral(1.5));
        assert_eq!(
            parse(r#""hello""#),
            Expression::StringLiteral("hello".to_string())
        );
    }

    #[test]
    fn test_parse_subquery() {
        match parse("max_over_time(rate(x[1m])[1h:5m])") {
            Expression::Function(call) => match &call.args[0] {
                Expression::RangeWindow(rw) => {
                    assert_eq!(rw.window, Some(Duration::from_secs(3600)));
                    assert!(matches!(rw.inner.as_deref(), Some(Expression::Function(_))));
                }
                other => panic!("expected subquery window, got {:?}", other),
            },
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = PromqlParser::new().parse("sum(").unwrap_err();
        assert!(matches!(err, ExplainError::Parse(ref msg) if !msg.is_empty()));
    }

    #[test]
    fn test_prettify() {
        let formatted = PromqlParser::new().prettify("sum(rate(x[5m]))").unwrap();
        assert!(formatted.contains("sum"));
        assert!(formatted.contains("rate"));
        assert!(PromqlParser::new().prettify("rate(").is_err());
    }
}
