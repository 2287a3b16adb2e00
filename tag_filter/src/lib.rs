//! Tag-based dynamic filter expressions
//!
//! Source text goes through `lexical` -> `syntax` -> `validation` once, at
//! group-definition time; the resulting expression is then evaluated
//! against one tag context per candidate entity.

// Internal modules
pub mod batch;
pub mod config;
pub mod evaluation;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod membership;
pub mod pipeline;
pub mod syntax;
pub mod tokens;
pub mod utils;
pub mod validation;

// Re-export key types for library consumers
pub use batch::{evaluate_members, BatchConfig, BatchError, BatchResults};
pub use evaluation::{evaluate, EvalError, TagContext};
pub use grammar::{ComparisonOp, Expression, TagPath};
pub use lexical::{tokenize, LexError};
pub use membership::{
    DynamicGroup, InMemoryTagProvider, MembershipDecision, NonNumericPolicy, TagContextProvider,
};
pub use pipeline::{compile, CompiledFilter, FilterCache, FilterError};
pub use syntax::{parse, ParseError};
pub use validation::{validate, ValidationError};

/// Lex and parse `source` without validation
pub fn parse_str(source: &str) -> Result<Expression, FilterError> {
    let tokens = tokenize(source)?;
    Ok(parse(&tokens)?)
}
