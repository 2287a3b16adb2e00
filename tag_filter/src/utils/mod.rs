//! Shared types and utilities used by the lexer, parser and diagnostics

pub mod span;

pub use span::{format_error_at, Position, Span, Spanned};
