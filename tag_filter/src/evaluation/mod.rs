//! Expression evaluation against a tag context
//!
//! Evaluation is a pure function of the tree and the context: no logging,
//! no I/O and no hidden state. `And`/`Or` short-circuit, so an erroring
//! right operand is never reached once the left operand decides the result.

pub mod context;
pub mod error;

pub use context::TagContext;
pub use error::EvalError;

use crate::grammar::{ComparisonOp, Expression, TagPath};

pub type EvalResult<T> = Result<T, EvalError>;

pub fn evaluate(expr: &Expression, ctx: &TagContext) -> EvalResult<bool> {
    match expr {
        Expression::Predicate { path } => Ok(evaluate_predicate(path, ctx)),
        Expression::Comparison { key, op, operand } => {
            evaluate_comparison(key, *op, *operand, ctx)
        }
        Expression::And { left, right } => Ok(evaluate(left, ctx)? && evaluate(right, ctx)?),
        Expression::Or { left, right } => Ok(evaluate(left, ctx)? || evaluate(right, ctx)?),
        Expression::Not { inner } => evaluate(inner, ctx).map(|matched| !matched),
        Expression::Group { inner } => evaluate(inner, ctx),
    }
}

/// Presence for a single segment, exact value match otherwise
fn evaluate_predicate(path: &TagPath, ctx: &TagContext) -> bool {
    match path.key_and_value() {
        (key, Some(expected)) => ctx.get(&key) == Some(expected),
        (key, None) => ctx.contains_key(&key),
    }
}

/// A missing tag never matches and is not an error
fn evaluate_comparison(
    key: &TagPath,
    op: ComparisonOp,
    operand: f64,
    ctx: &TagContext,
) -> EvalResult<bool> {
    let key = key.joined();
    let Some(raw) = ctx.get(&key) else {
        return Ok(false);
    };

    match parse_numeric_value(raw) {
        Some(value) => Ok(op.apply(value, operand)),
        None => Err(EvalError::NonNumericTagValue { key }),
    }
}

/// Numeric reading of a tag value: trimmed `[+-]?digits(.digits)?`.
///
/// `NaN`, `inf`, exponents and empty strings are not numbers here even
/// though `f64::from_str` accepts some of them.
pub fn parse_numeric_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let unsigned = trimmed
        .strip_prefix(|c| c == '+' || c == '-')
        .unwrap_or(trimmed);

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.map_or(true, all_digits) {
        return None;
    }

    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::syntax::parse;
    use assert_matches::assert_matches;

    fn expr(input: &str) -> Expression {
        parse(&tokenize(input).unwrap()).unwrap()
    }

    fn ctx(pairs: &[(&str, &str)]) -> TagContext {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_unvalidated_trees_do_not_panic() {
        let empty_pred = Expression::predicate(Vec::<String>::new());
        let empty_cmp = Expression::comparison(Vec::<String>::new(), ComparisonOp::Gt, 1.0);
        let nan_cmp = Expression::comparison(["k"], ComparisonOp::Gt, f64::NAN);
        let inf_cmp = Expression::comparison(["k"], ComparisonOp::Lt, f64::INFINITY);

        let tags = ctx(&[("", "x"), ("k", "5")]);
        assert_eq!(evaluate(&empty_pred, &tags), Ok(true));
        assert_eq!(evaluate(&Expression::not(empty_pred.clone()), &tags), Ok(false));
        assert_eq!(
            evaluate(&empty_cmp, &tags),
            Err(EvalError::NonNumericTagValue { key: String::new() })
        );
        assert_eq!(
            evaluate(&Expression::not(empty_cmp.clone()), &tags),
            Err(EvalError::NonNumericTagValue { key: String::new() })
        );
        assert_eq!(evaluate(&nan_cmp, &tags), Ok(false));
        assert_eq!(evaluate(&Expression::not(nan_cmp.clone()), &tags), Ok(true));
        assert_eq!(evaluate(&inf_cmp, &tags), Ok(true));

        let empty = TagContext::new();
        assert_eq!(evaluate(&empty_pred, &empty), Ok(false));
        assert_eq!(evaluate(&empty_cmp, &empty), Ok(false));
        assert_eq!(evaluate(&Expression::not(nan_cmp), &empty), Ok(true));
    }

    #[test]
    fn test_comparisons() {
        let risk = ctx(&[("risk_score", "85")]);
        assert_eq!(evaluate(&expr("tag.risk_score.gt.80"), &risk), Ok(true));
        assert_eq!(evaluate(&expr("tag.risk_score.gt.90"), &risk), Ok(false));
        assert_eq!(evaluate(&expr("tag.risk_score.le.85"), &risk), Ok(true));
        assert_eq!(evaluate(&expr("tag.risk_score.ge.85.0"), &risk), Ok(true));
        assert_eq!(evaluate(&expr("tag.risk_score.lt.-1"), &risk), Ok(false));
    }

    #[test]
    fn test_missing_tag_is_not_an_error() {
        assert_eq!(evaluate(&expr("tag.risk_score.gt.80"), &TagContext::new()), Ok(false));
        assert_eq!(evaluate(&expr("not tag.risk_score.gt.80"), &TagContext::new()), Ok(true));
    }

    #[test]
    fn test_non_numeric_value() {
        let bad = ctx(&[("risk_score", "very-high")]);
        assert_eq!(
            evaluate(&expr("tag.risk_score.gt.80"), &bad),
            Err(EvalError::NonNumericTagValue {
                key: "risk_score".to_string()
            })
        );
        // Errors pass through `not` unchanged
        assert_matches!(
            evaluate(&expr("not tag.risk_score.gt.80"), &bad),
            Err(EvalError::NonNumericTagValue { .. })
        );
    }

    #[test]
    fn test_equality_and_presence() {
        let tags = ctx(&[("criticality", "high"), ("vip", ""), ("env.region", "eu")]);
        assert_eq!(evaluate(&expr("tag.criticality.high"), &tags), Ok(true));
        assert_eq!(evaluate(&expr("tag.criticality.low"), &tags), Ok(false));
        assert_eq!(evaluate(&expr("tag.criticality.HIGH"), &tags), Ok(false));
        assert_eq!(evaluate(&expr("tag.vip"), &tags), Ok(true));
        assert_eq!(evaluate(&expr("tag.guest"), &tags), Ok(false));
        assert_eq!(evaluate(&expr("tag.env.region.eu"), &tags), Ok(true));
        assert_eq!(evaluate(&expr("not tag.criticality.high"), &tags), Ok(false));
    }

    #[test]
    fn test_equality_compares_text() {
        let tags = ctx(&[("build", "007")]);
        assert_eq!(evaluate(&expr("tag.build.007"), &tags), Ok(true));
        assert_eq!(evaluate(&expr("tag.build.7"), &tags), Ok(false));
    }

    #[test]
    fn test_short_circuit() {
        let tags = ctx(&[("risk_score", "very-high")]);
        let and = Expression::and(
            Expression::predicate(["missing_key"]),
            Expression::comparison(["risk_score"], ComparisonOp::Gt, 80.0),
        );
        assert_eq!(evaluate(&and, &tags), Ok(false));

        let or = expr("tag.risk_score or tag.risk_score.gt.80");
        assert_eq!(evaluate(&or, &tags), Ok(true));

        // Left error propagates before the right operand is considered
        let or = expr("tag.risk_score.gt.80 or tag.risk_score");
        assert_matches!(evaluate(&or, &tags), Err(EvalError::NonNumericTagValue { .. }));
    }

    #[test]
    fn test_group_is_transparent() {
        for tags in [ctx(&[("a", "b")]), ctx(&[("a", "c")]), TagContext::new()] {
            assert_eq!(
                evaluate(&expr("(tag.a.b)"), &tags),
                evaluate(&expr("tag.a.b"), &tags)
            );
        }
    }

    #[test]
    fn test_determinism() {
        let e = expr("tag.a or (tag.b.gt.2 and not tag.c.x)");
        let tags = ctx(&[("b", "3"), ("c", "y")]);
        let first = evaluate(&e, &tags);
        for _ in 0..10 {
            assert_eq!(evaluate(&e, &tags), first);
        }
    }

    #[test]
    fn test_parse_numeric_value() {
        assert_eq!(parse_numeric_value("85"), Some(85.0));
        assert_eq!(parse_numeric_value(" -2.5 "), Some(-2.5));
        assert_eq!(parse_numeric_value("+3"), Some(3.0));
        assert_eq!(parse_numeric_value("007"), Some(7.0));
        for bad in ["", "  ", "NaN", "inf", "-infinity", "1e3", "1.", ".5", "1.2.3", "0x10", "--1"] {
            assert_eq!(parse_numeric_value(bad), None, "{bad:?} should be non-numeric");
        }
    }
}
