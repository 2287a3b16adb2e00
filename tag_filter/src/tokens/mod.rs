//! Token system for filter expression lexical analysis
//!
//! - **[`Token`]** - identifiers, numbers, `.`, parentheses, `and`/`or`/`not`, EOF
//! - **[`SpannedToken`]** - tokens with source location information
//! - **[`TokenStream`]** - borrowed cursor with one-token lookahead for the parser

pub mod token;
pub mod token_stream;

pub use token::{classify_word, Token, TokenClass};
pub use token_stream::{SpannedToken, TokenStream};

pub use crate::utils::{Position, Span, Spanned};
