//! A parsed and validated filter ready for repeated evaluation

use crate::evaluation::{evaluate, EvalError, EvalResult, TagContext};
use crate::grammar::Expression;
use crate::membership::NonNumericPolicy;
use crate::validation::ExpressionMetrics;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFilter {
    source: String,
    expression: Expression,
    metrics: ExpressionMetrics,
}

impl CompiledFilter {
    pub(crate) fn new(source: String, expression: Expression) -> Self {
        let metrics = ExpressionMetrics::from_expression(&expression);
        Self {
            source,
            expression,
            metrics,
        }
    }

    /// Original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn metrics(&self) -> &ExpressionMetrics {
        &self.metrics
    }

    /// Canonical source form of the expression
    pub fn canonical(&self) -> String {
        self.expression.to_string()
    }

    pub fn evaluate(&self, ctx: &TagContext) -> EvalResult<bool> {
        evaluate(&self.expression, ctx)
    }

    /// Evaluate with `policy` deciding what a non-numeric tag value means
    pub fn matches(&self, ctx: &TagContext, policy: NonNumericPolicy) -> EvalResult<bool> {
        match self.evaluate(ctx) {
            Err(EvalError::NonNumericTagValue { .. }) if policy == NonNumericPolicy::NoMatch => {
                Ok(false)
            }
            other => other,
        }
    }

    pub fn into_expression(self) -> Expression {
        self.expression
    }
}
