//! Source location tracking for filter expressions
//!
//! Errors report byte offsets; `Position` additionally carries line and
//! column so multi-line expressions can be pointed at in diagnostics.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line, column, and byte offset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Byte offset from start of input (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Create the starting position (offset 0, line 1, column 1)
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Advance position by one character
    pub fn advance(self, ch: char) -> Self {
        match ch {
            '\n' => Self {
                offset: self.offset + 1,
                line: self.line + 1,
                column: 1,
            },
            _ => Self {
                offset: self.offset + ch.len_utf8(),
                line: self.line,
                column: self.column + 1,
            },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of source text from start to end position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(
            start.offset <= end.offset,
            "Span start must not be after end"
        );
        Self { start, end }
    }

    /// Zero-width span at a position (used for EOF)
    pub fn empty_at(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Byte offset of the first character covered
    pub fn offset(&self) -> usize {
        self.start.offset
    }

    /// Get the byte length of this span
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Combine this span with another to create a span that covers both
    pub fn to(&self, other: Span) -> Span {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Span::new(start, end)
    }

    /// Get the source text for this span from the input
    pub fn slice<'a>(&self, input: &'a str) -> &'a str {
        input
            .get(self.start.offset..self.end.offset)
            .unwrap_or_default()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value with its source location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Format an error message with the offending source line and a caret under `offset`
pub fn format_error_at(source: &str, offset: usize, message: &str) -> String {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(source.len());
    let line_number = source[..line_start].matches('\n').count() + 1;
    let column = source[line_start..offset].chars().count() + 1;

    let line_num_str = line_number.to_string();
    let padding = " ".repeat(line_num_str.len());

    format!(
        "Error: {}\n  --> {}:{}\n {} |\n{} | {}\n {} | {}^\n",
        message,
        line_number,
        column,
        padding,
        line_num_str,
        &source[line_start..line_end],
        padding,
        " ".repeat(column - 1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let pos = Position::start().advance('t').advance('\n').advance('a');
        assert_eq!(pos, Position::new(3, 2, 2));
    }

    #[test]
    fn test_span_merge_and_slice() {
        let source = "tag.a and tag.b";
        let first = Span::new(Position::new(0, 1, 1), Position::new(5, 1, 6));
        let second = Span::new(Position::new(10, 1, 11), Position::new(15, 1, 16));
        let merged = first.to(second);

        assert_eq!(merged.slice(source), source);
        assert_eq!(merged.len(), 15);
        assert_eq!(first.offset(), 0);
        assert!(Span::empty_at(Position::start()).is_empty());
    }

    #[test]
    fn test_format_error_points_at_offset() {
        let rendered = format_error_at("tag.a and $", 10, "Unexpected character '$'");
        assert!(rendered.contains("--> 1:11"));
        assert!(rendered.contains("1 | tag.a and $"));
        assert!(rendered.ends_with("          ^\n"));
    }

    #[test]
    fn test_format_error_on_second_line() {
        let rendered = format_error_at("tag.a\nand )", 10, "Unbalanced parentheses");
        assert!(rendered.contains("--> 2:5"));
        assert!(rendered.contains("2 | and )"));
    }
}
