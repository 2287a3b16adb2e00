//! Core lexical analyzer
//!
//! `LexicalAnalyzer` is a lazy iterator over tokens: each call to `next`
//! scans exactly one token, the last item is `Token::Eof`, and the iterator
//! is fused after the first error.

use crate::config::compile_time::lexical::{MAX_IDENTIFIER_LENGTH, MAX_TOKEN_COUNT};
use crate::logging::codes;
use crate::tokens::{classify_word, SpannedToken, Token};
use crate::utils::{Position, Span};
use std::iter::FusedIterator;

/// Lexical analysis errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { offset: usize, character: char },

    #[error("Invalid number '{text}' at offset {offset}")]
    InvalidNumber { offset: usize, text: String },

    #[error("Identifier too long at offset {offset}: {length} characters (max {max})")]
    IdentifierTooLong {
        offset: usize,
        length: usize,
        max: usize,
    },

    #[error("Too many tokens at offset {offset}: {count} (max {max})")]
    TooManyTokens {
        offset: usize,
        count: usize,
        max: usize,
    },
}

impl LexError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexError::UnexpectedCharacter { .. } => codes::lexical::UNEXPECTED_CHARACTER,
            LexError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
        }
    }

    /// Byte offset of the offending input
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { offset, .. }
            | LexError::InvalidNumber { offset, .. }
            | LexError::IdentifierTooLong { offset, .. }
            | LexError::TooManyTokens { offset, .. } => *offset,
        }
    }
}

/// Token counts gathered while scanning
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LexicalMetrics {
    /// Tokens emitted, excluding EOF
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub number_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub max_identifier_length: usize,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token) {
        match token {
            Token::Eof => return,
            Token::Ident(word) => {
                self.identifier_tokens += 1;
                self.max_identifier_length = self.max_identifier_length.max(word.len());
            }
            Token::Number { .. } => self.number_tokens += 1,
            Token::And | Token::Or | Token::Not => self.operator_tokens += 1,
            Token::Dot | Token::LParen | Token::RParen => self.punctuation_tokens += 1,
        }
        self.total_tokens += 1;
    }
}

/// Lazy tokenizer over a filter expression
pub struct LexicalAnalyzer<'a> {
    source: &'a str,
    pos: Position,
    metrics: LexicalMetrics,
    finished: bool,
}

impl<'a> LexicalAnalyzer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: Position::start(),
            metrics: LexicalMetrics::default(),
            finished: false,
        }
    }

    /// Metrics for the tokens produced so far
    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos.offset..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn eat_while<F>(&mut self, predicate: F)
    where
        F: Fn(char) -> bool,
    {
        while self.peek_char().is_some_and(&predicate) {
            self.bump();
        }
    }

    fn digit_follows(&self) -> bool {
        self.peek_nth(1).is_some_and(|c| c.is_ascii_digit())
    }

    fn text_from(&self, start: Position) -> &'a str {
        &self.source[start.offset..self.pos.offset]
    }

    fn finish(&mut self, token: Token, start: Position) -> SpannedToken {
        self.metrics.record_token(&token);
        SpannedToken::new(token, Span::new(start, self.pos))
    }

    /// Scan the next token
    fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        self.eat_while(|c| c.is_ascii_whitespace());

        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            return Ok(SpannedToken::new(Token::Eof, Span::empty_at(start)));
        };

        if self.metrics.total_tokens >= MAX_TOKEN_COUNT {
            return Err(LexError::TooManyTokens {
                offset: start.offset,
                count: self.metrics.total_tokens + 1,
                max: MAX_TOKEN_COUNT,
            });
        }

        match ch {
            c if c.is_ascii_alphabetic() || c == '_' => self.scan_word(start),
            c if c.is_ascii_digit() => self.scan_number(start),
            '-' if self.digit_follows() => self.scan_number(start),
            '.' | '(' | ')' => {
                self.bump();
                let token = match ch {
                    '.' => Token::Dot,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                };
                Ok(self.finish(token, start))
            }
            other => Err(LexError::UnexpectedCharacter {
                offset: start.offset,
                character: other,
            }),
        }
    }

    fn scan_word(&mut self, start: Position) -> Result<SpannedToken, LexError> {
        self.eat_while(is_identifier_continue);
        let word = self.text_from(start);

        if word.len() > MAX_IDENTIFIER_LENGTH {
            return Err(LexError::IdentifierTooLong {
                offset: start.offset,
                length: word.len(),
                max: MAX_IDENTIFIER_LENGTH,
            });
        }

        Ok(self.finish(classify_word(word), start))
    }

    /// NUMBER: `-?[0-9]+(\.[0-9]+)?`; a `.` is a decimal point only when a digit follows it
    fn scan_number(&mut self, start: Position) -> Result<SpannedToken, LexError> {
        if self.peek_char() == Some('-') {
            self.bump();
        }
        self.eat_while(|c| c.is_ascii_digit());

        if self.peek_char() == Some('.') && self.digit_follows() {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }

        // Letters glued to digits or a second decimal part
        let malformed = self.peek_char().is_some_and(is_identifier_continue)
            || (self.peek_char() == Some('.') && self.digit_follows());
        if malformed {
            loop {
                match self.peek_char() {
                    Some(c) if is_identifier_continue(c) => {
                        self.bump();
                    }
                    Some('.') if self.digit_follows() => {
                        self.bump();
                    }
                    _ => break,
                }
            }
            return Err(LexError::InvalidNumber {
                offset: start.offset,
                text: self.text_from(start).to_string(),
            });
        }

        let text = self.text_from(start);
        let value = text.parse::<f64>().map_err(|_| LexError::InvalidNumber {
            offset: start.offset,
            text: text.to_string(),
        })?;

        Ok(self.finish(
            Token::Number {
                text: text.to_string(),
                value,
            },
            start,
        ))
    }
}

impl Iterator for LexicalAnalyzer<'_> {
    type Item = Result<SpannedToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(token) if token.value.is_eof() => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(result)
    }
}

impl FusedIterator for LexicalAnalyzer<'_> {}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}
