//! Keyword system for filter expressions
//!
//! `and`, `or` and `not` are operator keywords and are matched case-insensitively.
//! `tag` and the comparison suffixes stay identifiers at the lexical level; the
//! parser gives them meaning by position, and they are matched case-sensitively.
use super::ast::ComparisonOp;
use serde::{Deserialize, Serialize};

/// Literal word that introduces every predicate
pub const TAG_KEYWORD: &str = "tag";

/// Operator keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    And,
    Or,
    Not,
}

impl Keyword {
    /// Parse an operator keyword, ignoring ASCII case
    pub fn from_str(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else if word.eq_ignore_ascii_case("not") {
            Some(Self::Not)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

/// Comparison suffix keyword (`gt`, `lt`, `ge`, `le`), lowercase only
pub fn comparison_keyword(word: &str) -> Option<ComparisonOp> {
    match word {
        "gt" => Some(ComparisonOp::Gt),
        "lt" => Some(ComparisonOp::Lt),
        "ge" => Some(ComparisonOp::Ge),
        "le" => Some(ComparisonOp::Le),
        _ => None,
    }
}

/// Words that cannot be written as tag keys or values
pub fn is_reserved_keyword(word: &str) -> bool {
    Keyword::from_str(word).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_keywords_ignore_case() {
        assert_eq!(Keyword::from_str("AND"), Some(Keyword::And));
        assert_eq!(Keyword::from_str("oR"), Some(Keyword::Or));
        assert_eq!(Keyword::from_str("not"), Some(Keyword::Not));
        assert_eq!(Keyword::from_str("nots"), None);
        assert_eq!(Keyword::Not.as_str(), "not");
    }

    #[test]
    fn test_comparison_keywords_are_lowercase_only() {
        assert_eq!(comparison_keyword("ge"), Some(ComparisonOp::Ge));
        assert_eq!(comparison_keyword("GT"), None);
        assert_eq!(comparison_keyword("eq"), None);
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_keyword("Or"));
        assert!(!is_reserved_keyword(TAG_KEYWORD));
    }
}
