//! Grammar definitions for filter expressions

pub mod ast;
pub mod keywords;

// Re-export AST types
pub use ast::nodes::*;

// Re-export keywords
pub use keywords::{comparison_keyword, is_reserved_keyword, Keyword, TAG_KEYWORD};
