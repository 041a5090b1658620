use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which kind of case committed (or failed to commit) a match.
///
/// Used for structured logs and the [`MatchMetrics`](crate::MatchMetrics) hook.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    /// Equality against a single value.
    Value,
    /// Equality against any value of a list.
    ValueSet,
    /// Caller-supplied boolean test.
    Predicate,
    /// Single type descriptor.
    Type,
    /// Any of a list of type descriptors.
    TypeSet,
    /// Unary function whose parameter type accepts the subject.
    Applicable,
    /// Explicit default at the end of the chain.
    Otherwise,
}

impl CaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseKind::Value => "value",
            CaseKind::ValueSet => "value_set",
            CaseKind::Predicate => "predicate",
            CaseKind::Type => "type",
            CaseKind::TypeSet => "type_set",
            CaseKind::Applicable => "applicable",
            CaseKind::Otherwise => "otherwise",
        }
    }
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running state of a matching expression.
///
/// The state only ever moves forward: `Unmatched` becomes `Matched` once, and
/// a failing [`filter`](crate::Cases::filter) turns `Matched` into `Rejected`.
/// Neither `Matched` nor `Rejected` evaluates any further case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MatchState<S, R> {
    /// No case has matched yet; the subject is still available.
    Unmatched(S),
    /// A case (or default) committed this result.
    Matched(R),
    /// A committed result was removed by a filter.
    Rejected,
}

impl<S, R> MatchState<S, R> {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchState::Matched(_))
    }

    /// The subject, while no case has matched.
    pub fn subject(&self) -> Option<&S> {
        match self {
            MatchState::Unmatched(subject) => Some(subject),
            _ => None,
        }
    }

    /// The committed result, if any.
    pub fn result(&self) -> Option<&R> {
        match self {
            MatchState::Matched(result) => Some(result),
            _ => None,
        }
    }
}

/// Errors produced by the matching engine.
///
/// Errors created by a throwing producer (`then_throw`, `otherwise_throw`)
/// are never wrapped in this type; they reach the caller as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MatchError {
    /// A required case argument was absent.
    #[error("case argument `{argument}` must not be absent")]
    NullArgument { argument: &'static str },
    /// No case matched and no default was supplied.
    #[error("no case matched ({cases} cases attached)")]
    NoMatch { cases: usize },
    /// A case matched but its result was rejected by a filter.
    #[error("matched result was filtered out")]
    EmptyResult,
}

impl MatchError {
    pub(crate) fn null_argument(argument: &'static str) -> Self {
        MatchError::NullArgument { argument }
    }
}
