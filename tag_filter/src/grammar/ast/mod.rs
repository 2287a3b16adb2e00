//! Abstract syntax tree for filter expressions

pub mod nodes;

pub use nodes::{ComparisonOp, Expression, TagPath};
