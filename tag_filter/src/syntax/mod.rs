//! Syntax analysis - token slice to expression AST
//!
//! A recursive-descent parser under fixed precedence (`or` < `and` < `not`,
//! parentheses override). Parsing is total: every token slice yields either
//! an `Expression` or a `ParseError` carrying the offending offset.

mod error;
mod parser;

pub use error::{ParseError, ParseResult};
pub use parser::FilterParser;

use crate::config::runtime::ParserPreferences;
use crate::grammar::Expression;
use crate::logging::codes;
use crate::tokens::SpannedToken;
use crate::{log_debug, log_error};

/// Parse tokens with the default nesting limit
pub fn parse(tokens: &[SpannedToken]) -> ParseResult<Expression> {
    run_parser(FilterParser::new(tokens), tokens.len())
}

/// Parse tokens with runtime parser preferences
pub fn parse_with_options(
    tokens: &[SpannedToken],
    preferences: &ParserPreferences,
) -> ParseResult<Expression> {
    run_parser(
        FilterParser::with_max_depth(tokens, preferences.max_nesting_depth),
        tokens.len(),
    )
}

fn run_parser(mut parser: FilterParser<'_>, token_count: usize) -> ParseResult<Expression> {
    let result = parser.parse();

    match &result {
        Ok(expr) => {
            log_debug!(code = codes::success::PARSE_COMPLETE, "Parse complete",
                "tokens" => token_count,
                "nodes" => expr.node_count()
            );
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(), offset = error.offset());
        }
    }

    result
}
