//! AST node definitions for filter expressions
//!
//! The tree is immutable once built: parents own their children through
//! `Box`, so it is finite and acyclic by construction. All nodes derive serde
//! so parsed filters can be cached in any structured format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Dotted path after the `tag` keyword, e.g. `criticality.high`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagPath {
    pub segments: Vec<String>,
}

impl TagPath {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// All segments joined with `.`
    pub fn joined(&self) -> String {
        self.segments.join(".")
    }

    /// Split into the tag key and the expected value.
    ///
    /// A single segment is a bare key (presence test); otherwise the last
    /// segment is the value and the rest, joined with `.`, is the key.
    pub fn key_and_value(&self) -> (String, Option<&str>) {
        match self.segments.split_last() {
            Some((value, key)) if !key.is_empty() => (key.join("."), Some(value.as_str())),
            _ => (self.joined(), None),
        }
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined())
    }
}

/// Numeric comparison operator written as a path suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOp {
    Gt,
    Lt,
    Ge,
    Le,
}

impl ComparisonOp {
    /// Keyword spelling used in source text
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Ge => "ge",
            Self::Le => "le",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }

    /// Apply the operator as `lhs <op> rhs`
    pub fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::Lt => lhs < rhs,
            Self::Ge => lhs >= rhs,
            Self::Le => lhs <= rhs,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter expression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    /// Presence (`tag.key`) or equality (`tag.key.value`) test
    Predicate { path: TagPath },
    /// Numeric test `tag.key.<op>.<number>`
    Comparison {
        key: TagPath,
        op: ComparisonOp,
        operand: f64,
    },
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not { inner: Box<Expression> },
    /// Parenthesized sub-expression; evaluates exactly like `inner`
    Group { inner: Box<Expression> },
}

impl Expression {
    pub fn predicate<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self::Predicate {
            path: TagPath::new(segments),
        }
    }

    pub fn comparison<S: Into<String>>(
        key: impl IntoIterator<Item = S>,
        op: ComparisonOp,
        operand: f64,
    ) -> Self {
        Self::Comparison {
            key: TagPath::new(key),
            op,
            operand,
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(inner: Expression) -> Self {
        Self::Not {
            inner: Box::new(inner),
        }
    }

    pub fn group(inner: Expression) -> Self {
        Self::Group {
            inner: Box::new(inner),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Predicate { .. } | Self::Comparison { .. })
    }

    /// Same tree with every `Group` node replaced by its contents
    pub fn strip_groups(&self) -> Expression {
        match self {
            Self::Group { inner } => inner.strip_groups(),
            Self::And { left, right } => Self::and(left.strip_groups(), right.strip_groups()),
            Self::Or { left, right } => Self::or(left.strip_groups(), right.strip_groups()),
            Self::Not { inner } => Self::not(inner.strip_groups()),
            leaf => leaf.clone(),
        }
    }

    /// Sorted, deduplicated tag keys the expression looks up
    pub fn referenced_keys(&self) -> Vec<String> {
        let mut keys = BTreeSet::new();
        self.collect_keys(&mut keys);
        keys.into_iter().collect()
    }

    fn collect_keys(&self, keys: &mut BTreeSet<String>) {
        match self {
            Self::Predicate { path } => {
                keys.insert(path.key_and_value().0);
            }
            Self::Comparison { key, .. } => {
                keys.insert(key.joined());
            }
            Self::And { left, right } | Self::Or { left, right } => {
                left.collect_keys(keys);
                right.collect_keys(keys);
            }
            Self::Not { inner } | Self::Group { inner } => inner.collect_keys(keys),
        }
    }

    /// Height of the tree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        match self {
            Self::Predicate { .. } | Self::Comparison { .. } => 1,
            Self::And { left, right } | Self::Or { left, right } => {
                1 + left.depth().max(right.depth())
            }
            Self::Not { inner } | Self::Group { inner } => 1 + inner.depth(),
        }
    }

    /// Largest number of `Group`/`Not` nodes on any root-to-leaf path
    pub fn nesting_depth(&self) -> usize {
        match self {
            Self::Predicate { .. } | Self::Comparison { .. } => 0,
            Self::And { left, right } | Self::Or { left, right } => {
                left.nesting_depth().max(right.nesting_depth())
            }
            Self::Not { inner } | Self::Group { inner } => 1 + inner.nesting_depth(),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Self::Predicate { .. } | Self::Comparison { .. } => 1,
            Self::And { left, right } | Self::Or { left, right } => {
                1 + left.node_count() + right.node_count()
            }
            Self::Not { inner } | Self::Group { inner } => 1 + inner.node_count(),
        }
    }
}

/// Canonical source form. Parentheses are written only for `Group` nodes, so
/// re-parsing the output of a parser-built tree yields an equal tree.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate { path } => write!(f, "tag.{}", path),
            Self::Comparison { key, op, operand } => write!(f, "tag.{}.{}.{}", key, op, operand),
            Self::And { left, right } => write!(f, "{} and {}", left, right),
            Self::Or { left, right } => write!(f, "{} or {}", left, right),
            Self::Not { inner } => write!(f, "not {}", inner),
            Self::Group { inner } => write!(f, "({})", inner),
        }
    }
}
