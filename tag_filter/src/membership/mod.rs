//! Dynamic group membership
//!
//! A `DynamicGroup` pairs a name with a compiled filter. Membership of an
//! entity is decided by evaluating the filter against the entity's current
//! tags; an entity the provider does not know is treated as having no tags.

pub mod provider;

pub use provider::{InMemoryTagProvider, TagContextProvider};

use crate::config::runtime::ParserPreferences;
use crate::evaluation::{EvalError, TagContext};
use crate::pipeline::{compile_with_options, CompiledFilter, FilterError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a comparison against a non-numeric tag value is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonNumericPolicy {
    /// The entity is not a member
    #[default]
    NoMatch,
    /// Report the entity as an evaluation error
    Error,
}

impl NonNumericPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoMatch => "no_match",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipDecision {
    Member,
    NotMember,
    Error(EvalError),
}

impl MembershipDecision {
    pub fn is_member(&self) -> bool {
        matches!(self, Self::Member)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl From<Result<bool, EvalError>> for MembershipDecision {
    fn from(result: Result<bool, EvalError>) -> Self {
        match result {
            Ok(true) => Self::Member,
            Ok(false) => Self::NotMember,
            Err(e) => Self::Error(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DynamicGroup {
    name: String,
    filter: Arc<CompiledFilter>,
}

impl DynamicGroup {
    /// Compile `filter` and bind it to `name`
    pub fn new(name: impl Into<String>, filter: &str) -> Result<Self, FilterError> {
        Self::with_preferences(name, filter, &ParserPreferences::default())
    }

    pub fn with_preferences(
        name: impl Into<String>,
        filter: &str,
        preferences: &ParserPreferences,
    ) -> Result<Self, FilterError> {
        Ok(Self::from_compiled(
            name,
            Arc::new(compile_with_options(filter, preferences)?),
        ))
    }

    /// Share an already compiled filter, e.g. one from a `FilterCache`
    pub fn from_compiled(name: impl Into<String>, filter: Arc<CompiledFilter>) -> Self {
        Self {
            name: name.into(),
            filter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &CompiledFilter {
        &self.filter
    }

    /// Decide membership for an already materialized context
    pub fn decide(&self, ctx: &TagContext, policy: NonNumericPolicy) -> MembershipDecision {
        self.filter.matches(ctx, policy).into()
    }

    /// Decide membership of `entity` using tags from `provider`
    pub fn decide_for<P>(&self, provider: &P, entity: &str, policy: NonNumericPolicy) -> MembershipDecision
    where
        P: TagContextProvider + ?Sized,
    {
        let ctx = provider.tag_context(entity).unwrap_or_default();
        self.decide(&ctx, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn provider() -> InMemoryTagProvider {
        InMemoryTagProvider::from_iter([
            (
                "alice",
                TagContext::from_iter([("user_type", "contractor"), ("risk_score", "95")]),
            ),
            (
                "bob",
                TagContext::from_iter([("user_type", "employee"), ("criticality", "high")]),
            ),
            (
                "carol",
                TagContext::from_iter([("user_type", "contractor"), ("risk_score", "unknown")]),
            ),
        ])
    }

    fn group() -> DynamicGroup {
        DynamicGroup::new(
            "risky-contractors",
            "tag.user_type.contractor and (tag.criticality.high or tag.risk_score.gt.80)",
        )
        .unwrap()
    }

    #[test]
    fn test_decisions() {
        let group = group();
        let provider = provider();

        assert_eq!(group.name(), "risky-contractors");
        assert!(group.decide_for(&provider, "alice", NonNumericPolicy::NoMatch).is_member());
        assert_eq!(
            group.decide_for(&provider, "bob", NonNumericPolicy::NoMatch),
            MembershipDecision::NotMember
        );
    }

    #[test]
    fn test_non_numeric_policy() {
        let group = group();
        let provider = provider();

        assert_eq!(
            group.decide_for(&provider, "carol", NonNumericPolicy::NoMatch),
            MembershipDecision::NotMember
        );
        assert_matches!(
            group.decide_for(&provider, "carol", NonNumericPolicy::Error),
            MembershipDecision::Error(EvalError::NonNumericTagValue { ref key }) if key == "risk_score"
        );
    }

    #[test]
    fn test_unknown_entity_has_no_tags() {
        let outsiders = DynamicGroup::new("outsiders", "not tag.user_type").unwrap();
        assert!(outsiders
            .decide_for(&provider(), "mallory", NonNumericPolicy::Error)
            .is_member());
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        assert_matches!(
            DynamicGroup::new("broken", "tag.a or"),
            Err(FilterError::Parse(_))
        );
    }

    #[test]
    fn test_policy_serde() {
        assert_eq!(
            serde_json::to_string(&NonNumericPolicy::NoMatch).unwrap(),
            "\"no_match\""
        );
        let policy: NonNumericPolicy = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(policy, NonNumericPolicy::Error);
        assert_eq!(NonNumericPolicy::default(), NonNumericPolicy::NoMatch);
    }
}
