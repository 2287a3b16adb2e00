//! Lexical analysis for filter expressions
//!
//! Turns expression text into a token vector terminated by `Token::Eof`.
//! Whitespace is skipped and never produces tokens.

pub mod analyzer;

use crate::logging::codes;
use crate::tokens::SpannedToken;
use crate::{log_debug, log_error};

pub use analyzer::{LexError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize an expression; the last token is always `Token::Eof`
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexError> {
    tokenize_with_metrics(input).map(|(tokens, _)| tokens)
}

/// Tokenize and return the counts gathered along the way
pub fn tokenize_with_metrics(input: &str) -> Result<(Vec<SpannedToken>, LexicalMetrics), LexError> {
    let mut analyzer = LexicalAnalyzer::new(input);
    let result: Result<Vec<SpannedToken>, LexError> = analyzer.by_ref().collect();

    match result {
        Ok(tokens) => {
            let metrics = analyzer.metrics().clone();
            log_debug!(code = codes::success::TOKENIZATION_COMPLETE, "Tokenization complete",
                "tokens" => metrics.total_tokens,
                "input_length" => input.len()
            );
            Ok((tokens, metrics))
        }
        Err(e) => {
            log_error!(e.error_code(), &e.to_string(), offset = e.offset());
            Err(e)
        }
    }
}
