//! Static validation of expression trees
//!
//! Runs without a tag context, at group-definition time. Validation is
//! fail-fast: the first problem found in pre-order is returned and no
//! attempt is made to collect further errors.

pub mod error;
pub mod metrics;

pub use error::{ValidationError, ValidationResult};
pub use metrics::ExpressionMetrics;

use crate::config::compile_time::syntax::{DEFAULT_MAX_NESTING_DEPTH, HARD_MAX_NESTING_DEPTH};
use crate::grammar::{comparison_keyword, is_reserved_keyword, Expression, TagPath};
use crate::logging::codes;
use crate::{log_debug, log_error};

/// Validate with the default nesting limit
pub fn validate(expr: &Expression) -> ValidationResult<()> {
    validate_with_limit(expr, DEFAULT_MAX_NESTING_DEPTH)
}

/// Validate with a custom nesting limit, clamped to `1..=HARD_MAX_NESTING_DEPTH`
pub fn validate_with_limit(expr: &Expression, max_nesting_depth: usize) -> ValidationResult<()> {
    let max = max_nesting_depth.clamp(1, HARD_MAX_NESTING_DEPTH);

    match check_node(expr, 0, max) {
        Ok(()) => {
            log_debug!(code = codes::success::VALIDATION_PASSED, "Validation passed",
                "nodes" => expr.node_count()
            );
            Ok(())
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string());
            Err(error)
        }
    }
}

fn check_node(expr: &Expression, depth: usize, max: usize) -> ValidationResult<()> {
    match expr {
        Expression::Predicate { path } => check_path(path),
        Expression::Comparison { key, operand, .. } => {
            check_path(key)?;
            if !operand.is_finite() {
                return Err(ValidationError::NonFiniteComparisonOperand {
                    key: key.joined(),
                    value: *operand,
                });
            }
            Ok(())
        }
        Expression::And { left, right } | Expression::Or { left, right } => {
            check_node(left, depth, max)?;
            check_node(right, depth, max)
        }
        Expression::Not { inner } | Expression::Group { inner } => {
            let depth = depth + 1;
            if depth > max {
                return Err(ValidationError::NestingTooDeep { depth, max });
            }
            check_node(inner, depth, max)
        }
    }
}

/// Every segment must be re-parseable to the same path
fn check_path(path: &TagPath) -> ValidationResult<()> {
    if path.is_empty() {
        return Err(ValidationError::EmptyTagPath);
    }

    for (index, segment) in path.segments.iter().enumerate() {
        let shadowed_by_comparison = index > 0 && comparison_keyword(segment).is_some();
        if !is_valid_segment(segment) || is_reserved_keyword(segment) || shadowed_by_comparison {
            return Err(ValidationError::InvalidTagSegment {
                segment: segment.clone(),
            });
        }
    }
    Ok(())
}

/// Identifier `[A-Za-z_][A-Za-z0-9_-]*` or number `-?[0-9]+(\.[0-9]+)?`
fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        Some(_) => is_number_literal(segment),
        None => false,
    }
}

fn is_number_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    all_digits(whole) && fraction.map_or(true, all_digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ComparisonOp;
    use assert_matches::assert_matches;

    #[test]
    fn test_valid_trees() {
        let expr = Expression::and(
            Expression::predicate(["build", "007"]),
            Expression::not(Expression::comparison(["risk"], ComparisonOp::Ge, -1.5)),
        );
        assert_eq!(validate(&expr), Ok(()));
        assert_eq!(validate(&Expression::predicate(["gt", "5"])), Ok(()));
    }

    #[test]
    fn test_empty_paths() {
        let empty: [&str; 0] = [];
        assert_matches!(
            validate(&Expression::predicate(empty)),
            Err(ValidationError::EmptyTagPath)
        );
        assert_matches!(
            validate(&Expression::or(
                Expression::predicate(["a"]),
                Expression::comparison(empty, ComparisonOp::Lt, 1.0)
            )),
            Err(ValidationError::EmptyTagPath)
        );
    }

    #[test]
    fn test_non_finite_operands() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let expr = Expression::comparison(["risk"], ComparisonOp::Gt, value);
            assert_matches!(
                validate(&expr),
                Err(ValidationError::NonFiniteComparisonOperand { ref key, .. }) if key == "risk"
            );
        }
    }

    #[test]
    fn test_invalid_segments() {
        for bad in ["", "has space", "dollar$", "1.", "and", "9lives", "-"] {
            assert_matches!(
                validate(&Expression::predicate(["key", bad])),
                Err(ValidationError::InvalidTagSegment { ref segment }) if segment == bad
            );
        }
        // Would re-parse as a comparison
        assert_matches!(
            validate(&Expression::predicate(["risk", "gt", "5"])),
            Err(ValidationError::InvalidTagSegment { ref segment }) if segment == "gt"
        );
    }

    #[test]
    fn test_fail_fast_returns_first_error() {
        let empty: [&str; 0] = [];
        let expr = Expression::and(
            Expression::predicate(["bad segment"]),
            Expression::predicate(empty),
        );
        assert_matches!(validate(&expr), Err(ValidationError::InvalidTagSegment { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let mut expr = Expression::predicate(["a"]);
        for _ in 0..3 {
            expr = Expression::group(Expression::not(expr));
        }
        assert_eq!(validate_with_limit(&expr, 6), Ok(()));
        assert_matches!(
            validate_with_limit(&expr, 5),
            Err(ValidationError::NestingTooDeep { depth: 6, max: 5 })
        );

        // A zero limit is raised to one level
        assert_eq!(validate_with_limit(&Expression::not(Expression::predicate(["a"])), 0), Ok(()));
    }

    #[test]
    fn test_number_literals() {
        assert!(is_number_literal("80"));
        assert!(is_number_literal("-2.5"));
        assert!(!is_number_literal("+2"));
        assert!(!is_number_literal("2."));
        assert!(!is_number_literal(".5"));
        assert!(!is_number_literal("1e3"));
    }
}
