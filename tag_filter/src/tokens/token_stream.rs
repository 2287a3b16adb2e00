//! Borrowed cursor over lexed tokens used by the parser

use crate::{
    tokens::token::Token,
    utils::{Span, Spanned},
};

/// A token with span information
pub type SpannedToken = Spanned<Token>;

static EOF_TOKEN: Token = Token::Eof;

/// Cursor over a token slice. Reading past the end behaves as if an
/// `Eof` token were present, so a slice without one is still safe to parse.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    tokens: &'a [SpannedToken],
    position: usize,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Get the current token with its span
    pub fn current(&self) -> Option<&'a SpannedToken> {
        self.tokens.get(self.position)
    }

    /// Get the current token value, `Eof` once the slice is exhausted
    pub fn current_token(&self) -> &'a Token {
        self.current()
            .map(|spanned| &spanned.value)
            .unwrap_or(&EOF_TOKEN)
    }

    /// Byte offset of the current token (end of input when exhausted)
    pub fn current_offset(&self) -> usize {
        match self.current() {
            Some(spanned) => spanned.span.offset(),
            None => self.end_offset(),
        }
    }

    pub fn current_span(&self) -> Option<Span> {
        self.current().map(|spanned| spanned.span)
    }

    /// Peek at the token after the current one
    pub fn peek(&self) -> &'a Token {
        self.tokens
            .get(self.position + 1)
            .map(|spanned| &spanned.value)
            .unwrap_or(&EOF_TOKEN)
    }

    /// Advance and return the token that was current
    pub fn advance(&mut self) -> Option<&'a SpannedToken> {
        let current = self.current();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        current
    }

    pub fn check_token(&self, expected: &Token) -> bool {
        self.current_token() == expected
    }

    /// Advance if the current token equals `expected`
    pub fn advance_if_matches(&mut self, expected: &Token) -> bool {
        if self.check_token(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current_token().is_eof()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of tokens excluding a trailing `Eof`
    pub fn significant_len(&self) -> usize {
        match self.tokens.last() {
            Some(last) if last.value.is_eof() => self.tokens.len() - 1,
            _ => self.tokens.len(),
        }
    }

    fn end_offset(&self) -> usize {
        self.tokens
            .last()
            .map(|spanned| spanned.span.end.offset)
            .unwrap_or(0)
    }
}
