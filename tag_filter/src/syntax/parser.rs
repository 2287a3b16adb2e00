//! Recursive-descent parser for filter expressions
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr         := or_expr
//! or_expr      := and_expr ( "or" and_expr )*
//! and_expr     := not_expr ( "and" not_expr )*
//! not_expr     := "not" not_expr | primary
//! primary      := "(" expr ")" | predicate
//! predicate    := "tag" "." path_segment ( "." path_segment )*
//! path_segment := IDENT | NUMBER
//! ```
//!
//! Binary operators are left-associative. Recursion only happens through
//! parentheses and `not`, both of which count against the nesting limit.

use crate::config::compile_time::syntax::{DEFAULT_MAX_NESTING_DEPTH, HARD_MAX_NESTING_DEPTH};
use crate::grammar::{comparison_keyword, ComparisonOp, Expression, TagPath, TAG_KEYWORD};
use crate::syntax::error::{ParseError, ParseResult};
use crate::tokens::{SpannedToken, Token, TokenStream};

pub struct FilterParser<'a> {
    tokens: TokenStream<'a>,
    max_depth: usize,
    depth: usize,
    open_parens: usize,
}

impl<'a> FilterParser<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self::with_max_depth(tokens, DEFAULT_MAX_NESTING_DEPTH)
    }

    /// Parser with a custom nesting limit, clamped to `1..=HARD_MAX_NESTING_DEPTH`
    pub fn with_max_depth(tokens: &'a [SpannedToken], max_depth: usize) -> Self {
        Self {
            tokens: TokenStream::new(tokens),
            max_depth: max_depth.clamp(1, HARD_MAX_NESTING_DEPTH),
            depth: 0,
            open_parens: 0,
        }
    }

    /// Parse the whole token slice into one expression
    pub fn parse(&mut self) -> ParseResult<Expression> {
        if self.tokens.is_at_end() {
            return Err(ParseError::EmptyExpression {
                offset: self.tokens.current_offset(),
            });
        }

        let expr = self.parse_or()?;

        match self.tokens.current_token() {
            Token::Eof => Ok(expr),
            Token::RParen => Err(ParseError::UnbalancedParens {
                offset: self.tokens.current_offset(),
            }),
            other => Err(ParseError::TrailingTokens {
                offset: self.tokens.current_offset(),
                found: other.describe(),
            }),
        }
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;
        while self.tokens.advance_if_matches(&Token::Or) {
            let right = self.parse_and()?;
            left = Expression::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_not()?;
        while self.tokens.advance_if_matches(&Token::And) {
            let right = self.parse_not()?;
            left = Expression::and(left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Expression> {
        if !self.tokens.check_token(&Token::Not) {
            return self.parse_primary();
        }

        let offset = self.tokens.current_offset();
        self.tokens.advance();
        self.enter_nesting(offset)?;
        let inner = self.parse_not()?;
        self.depth -= 1;
        Ok(Expression::not(inner))
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let offset = self.tokens.current_offset();

        match self.tokens.current_token() {
            Token::LParen => self.parse_group(offset),
            Token::Ident(word) if word == TAG_KEYWORD => self.parse_predicate(),
            Token::RParen if self.open_parens == 0 => Err(ParseError::UnbalancedParens { offset }),
            token @ (Token::Ident(_) | Token::Number { .. } | Token::Dot) => {
                Err(ParseError::unexpected_token(offset, token.describe(), "'tag'"))
            }
            token => Err(ParseError::unexpected_token(
                offset,
                token.describe(),
                "expression",
            )),
        }
    }

    fn parse_group(&mut self, open_offset: usize) -> ParseResult<Expression> {
        self.tokens.advance();

        match self.tokens.current_token() {
            Token::RParen => {
                return Err(ParseError::EmptyExpression {
                    offset: open_offset,
                })
            }
            Token::Eof => {
                return Err(ParseError::UnbalancedParens {
                    offset: open_offset,
                })
            }
            _ => {}
        }

        self.enter_nesting(open_offset)?;
        self.open_parens += 1;
        let inner = self.parse_or()?;

        match self.tokens.current_token() {
            Token::RParen => {
                self.tokens.advance();
            }
            Token::Eof => {
                return Err(ParseError::UnbalancedParens {
                    offset: open_offset,
                })
            }
            other => {
                return Err(ParseError::unexpected_token(
                    self.tokens.current_offset(),
                    other.describe(),
                    "')'",
                ))
            }
        }

        self.open_parens -= 1;
        self.depth -= 1;
        Ok(Expression::group(inner))
    }

    /// `tag` has already been checked by the caller
    fn parse_predicate(&mut self) -> ParseResult<Expression> {
        self.tokens.advance();
        self.expect_dot()?;

        let mut segments = vec![self.expect_segment()?];

        while self.tokens.advance_if_matches(&Token::Dot) {
            let segment = self.expect_segment()?;

            // Only recognised after the first segment
            if let Some(op) = comparison_keyword(&segment) {
                return self.parse_comparison(segments, op);
            }
            segments.push(segment);
        }

        Ok(Expression::Predicate {
            path: TagPath::new(segments),
        })
    }

    /// Tail of `tag.<key>.<op>.<number>`; the keyword has been consumed
    fn parse_comparison(&mut self, key: Vec<String>, op: ComparisonOp) -> ParseResult<Expression> {
        if !self.tokens.advance_if_matches(&Token::Dot) {
            return Err(self.invalid_operand());
        }

        let operand = match self.tokens.current_token() {
            Token::Number { value, .. } => *value,
            _ => return Err(self.invalid_operand()),
        };
        self.tokens.advance();

        // The number must end the path
        if self.tokens.advance_if_matches(&Token::Dot) {
            return Err(self.invalid_operand());
        }

        Ok(Expression::Comparison {
            key: TagPath::new(key),
            op,
            operand,
        })
    }

    fn invalid_operand(&self) -> ParseError {
        ParseError::InvalidComparisonOperand {
            offset: self.tokens.current_offset(),
            found: self.tokens.current_token().describe(),
        }
    }

    fn expect_dot(&mut self) -> ParseResult<()> {
        if self.tokens.advance_if_matches(&Token::Dot) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.tokens.current_offset(),
                self.tokens.current_token().describe(),
                "'.'",
            ))
        }
    }

    fn expect_segment(&mut self) -> ParseResult<String> {
        let token = self.tokens.current_token();
        match token.as_path_segment() {
            Some(segment) => {
                let segment = segment.to_string();
                self.tokens.advance();
                Ok(segment)
            }
            None => Err(ParseError::unexpected_token(
                self.tokens.current_offset(),
                token.describe(),
                "tag path segment",
            )),
        }
    }

    fn enter_nesting(&mut self, offset: usize) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::NestingTooDeep {
                offset,
                depth: self.depth,
                max: self.max_depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use assert_matches::assert_matches;

    fn parse_str(input: &str) -> ParseResult<Expression> {
        let tokens = tokenize(input).unwrap();
        FilterParser::new(&tokens).parse()
    }

    fn parse_depth(input: &str, max_depth: usize) -> ParseResult<Expression> {
        let tokens = tokenize(input).unwrap();
        FilterParser::with_max_depth(&tokens, max_depth).parse()
    }

    #[test]
    fn test_predicates() {
        assert_eq!(
            parse_str("tag.criticality.high").unwrap(),
            Expression::predicate(["criticality", "high"])
        );
        assert_eq!(parse_str("tag.vip").unwrap(), Expression::predicate(["vip"]));
        assert_eq!(
            parse_str("tag.build.007").unwrap(),
            Expression::predicate(["build", "007"])
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            parse_str("tag.risk_score.gt.80").unwrap(),
            Expression::comparison(["risk_score"], ComparisonOp::Gt, 80.0)
        );
        assert_eq!(
            parse_str("tag.env.load.le.-0.5").unwrap(),
            Expression::comparison(["env", "load"], ComparisonOp::Le, -0.5)
        );
        // Comparison keywords are ordinary names as the first segment or in uppercase
        assert_eq!(parse_str("tag.gt.5").unwrap(), Expression::predicate(["gt", "5"]));
        assert_eq!(
            parse_str("tag.level.GT.5").unwrap(),
            Expression::predicate(["level", "GT", "5"])
        );
    }

    #[test]
    fn test_invalid_comparison_operands() {
        assert_matches!(
            parse_str("tag.risk.gt.high"),
            Err(ParseError::InvalidComparisonOperand { offset: 12, ref found }) if found == "identifier 'high'"
        );
        assert_matches!(
            parse_str("tag.risk.gt"),
            Err(ParseError::InvalidComparisonOperand { offset: 11, .. })
        );
        assert_matches!(
            parse_str("tag.risk.gt and tag.a"),
            Err(ParseError::InvalidComparisonOperand { offset: 12, .. })
        );
        assert_matches!(
            parse_str("tag.risk.gt.80.extra"),
            Err(ParseError::InvalidComparisonOperand { offset: 15, .. })
        );
    }

    #[test]
    fn test_precedence() {
        let flat = parse_str("tag.a or tag.b and tag.c").unwrap();
        let right = parse_str("tag.a or (tag.b and tag.c)").unwrap();
        let left = parse_str("(tag.a or tag.b) and tag.c").unwrap();

        assert_eq!(flat, right.strip_groups());
        assert_ne!(flat, left.strip_groups());
        assert_eq!(
            flat,
            Expression::or(
                Expression::predicate(["a"]),
                Expression::and(Expression::predicate(["b"]), Expression::predicate(["c"]))
            )
        );
    }

    #[test]
    fn test_not_binds_tighter_than_and() {
        assert_eq!(
            parse_str("not tag.a and tag.b").unwrap(),
            Expression::and(
                Expression::not(Expression::predicate(["a"])),
                Expression::predicate(["b"])
            )
        );
        assert_eq!(
            parse_str("NOT not tag.a").unwrap(),
            Expression::not(Expression::not(Expression::predicate(["a"])))
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            parse_str("tag.a or tag.b or tag.c").unwrap(),
            Expression::or(
                Expression::or(Expression::predicate(["a"]), Expression::predicate(["b"])),
                Expression::predicate(["c"])
            )
        );
    }

    #[test]
    fn test_groups_are_kept() {
        assert_eq!(
            parse_str("((tag.a))").unwrap(),
            Expression::group(Expression::group(Expression::predicate(["a"])))
        );
    }

    #[test]
    fn test_dangling_operators() {
        assert_matches!(
            parse_str("tag.criticality.high and"),
            Err(ParseError::UnexpectedToken { offset: 24, ref expected, .. }) if expected == "expression"
        );
        assert_matches!(
            parse_str("or tag.a"),
            Err(ParseError::UnexpectedToken { offset: 0, .. })
        );
        assert_matches!(parse_str("not"), Err(ParseError::UnexpectedToken { offset: 3, .. }));
        assert_matches!(
            parse_str("(tag.a and )"),
            Err(ParseError::UnexpectedToken { offset: 11, .. })
        );
    }

    #[test]
    fn test_predicate_must_start_with_tag() {
        assert_matches!(
            parse_str("criticality.high"),
            Err(ParseError::UnexpectedToken { offset: 0, ref expected, .. }) if expected == "'tag'"
        );
        assert_matches!(
            parse_str("Tag.a"),
            Err(ParseError::UnexpectedToken { offset: 0, ref expected, .. }) if expected == "'tag'"
        );
        assert_matches!(
            parse_str("tag"),
            Err(ParseError::UnexpectedToken { offset: 3, ref expected, .. }) if expected == "'.'"
        );
        assert_matches!(
            parse_str("tag.a..b"),
            Err(ParseError::UnexpectedToken { offset: 6, .. })
        );
    }

    #[test]
    fn test_unbalanced_parens() {
        assert_matches!(parse_str("(tag.a"), Err(ParseError::UnbalancedParens { offset: 0 }));
        assert_matches!(parse_str("tag.a)"), Err(ParseError::UnbalancedParens { offset: 5 }));
        assert_matches!(parse_str(")"), Err(ParseError::UnbalancedParens { offset: 0 }));
        assert_matches!(
            parse_str("tag.a and ((tag.b)"),
            Err(ParseError::UnbalancedParens { offset: 10 })
        );
        assert_matches!(parse_str("("), Err(ParseError::UnbalancedParens { offset: 0 }));
    }

    #[test]
    fn test_empty_expressions() {
        assert_matches!(parse_str(""), Err(ParseError::EmptyExpression { offset: 0 }));
        assert_matches!(parse_str("   "), Err(ParseError::EmptyExpression { offset: 3 }));
        assert_matches!(parse_str("()"), Err(ParseError::EmptyExpression { offset: 0 }));
        assert_matches!(
            parse_str("tag.a and ()"),
            Err(ParseError::EmptyExpression { offset: 10 })
        );
    }

    #[test]
    fn test_trailing_tokens() {
        assert_matches!(
            parse_str("tag.a tag.b"),
            Err(ParseError::TrailingTokens { offset: 6, ref found }) if found == "identifier 'tag'"
        );
        assert_matches!(
            parse_str("(tag.a) (tag.b)"),
            Err(ParseError::TrailingTokens { offset: 8, .. })
        );
    }

    #[test]
    fn test_nesting_limit() {
        let nested = format!("{}tag.a{}", "(".repeat(3), ")".repeat(3));
        assert!(parse_depth(&nested, 3).is_ok());
        assert_matches!(
            parse_depth(&nested, 2),
            Err(ParseError::NestingTooDeep { offset: 2, depth: 3, max: 2 })
        );

        // Stacked `not` counts together with parentheses
        assert_matches!(
            parse_depth("not (not tag.a)", 2),
            Err(ParseError::NestingTooDeep { offset: 5, depth: 3, max: 2 })
        );

        let deep = format!("{}tag.a", "not ".repeat(DEFAULT_MAX_NESTING_DEPTH + 1));
        assert_matches!(parse_str(&deep), Err(ParseError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_sibling_groups_do_not_accumulate_depth() {
        let input = (0..10)
            .map(|i| format!("(tag.k{})", i))
            .collect::<Vec<_>>()
            .join(" and ");
        assert!(parse_depth(&input, 1).is_ok());
    }

    #[test]
    fn test_missing_eof_is_tolerated() {
        let mut tokens = tokenize("tag.a and tag.b").unwrap();
        tokens.pop();
        assert!(FilterParser::new(&tokens).parse().is_ok());
    }

    #[test]
    fn test_canonical_form_reparses_to_same_tree() {
        for input in [
            "tag.user_type.contractor and (tag.criticality.high or tag.risk_score.gt.80)",
            "not (tag.a or tag.b) and not not tag.c.ge.1.5",
            "tag.x.le.-3 or tag.y.007 or tag.z",
        ] {
            let expr = parse_str(input).unwrap();
            assert_eq!(parse_str(&expr.to_string()).unwrap(), expr);
        }
    }
}
