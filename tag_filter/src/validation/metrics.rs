//! Static shape metrics for an expression tree

use crate::grammar::Expression;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpressionMetrics {
    /// Presence and equality leaves
    pub predicate_count: usize,
    pub comparison_count: usize,
    pub and_count: usize,
    pub or_count: usize,
    pub not_count: usize,
    pub group_count: usize,
    /// Largest number of stacked `Group`/`Not` nodes
    pub nesting_depth: usize,
    /// Height of the tree
    pub tree_depth: usize,
    pub node_count: usize,
    /// Distinct tag keys looked up during evaluation
    pub referenced_keys: Vec<String>,
}

impl ExpressionMetrics {
    pub fn from_expression(expr: &Expression) -> Self {
        let mut metrics = Self {
            nesting_depth: expr.nesting_depth(),
            tree_depth: expr.depth(),
            node_count: expr.node_count(),
            referenced_keys: expr.referenced_keys(),
            ..Self::default()
        };
        metrics.count_nodes(expr);
        metrics
    }

    fn count_nodes(&mut self, expr: &Expression) {
        match expr {
            Expression::Predicate { .. } => self.predicate_count += 1,
            Expression::Comparison { .. } => self.comparison_count += 1,
            Expression::And { left, right } => {
                self.and_count += 1;
                self.count_nodes(left);
                self.count_nodes(right);
            }
            Expression::Or { left, right } => {
                self.or_count += 1;
                self.count_nodes(left);
                self.count_nodes(right);
            }
            Expression::Not { inner } => {
                self.not_count += 1;
                self.count_nodes(inner);
            }
            Expression::Group { inner } => {
                self.group_count += 1;
                self.count_nodes(inner);
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        self.predicate_count + self.comparison_count
    }

    pub fn combinator_count(&self) -> usize {
        self.and_count + self.or_count + self.not_count + self.group_count
    }
}
