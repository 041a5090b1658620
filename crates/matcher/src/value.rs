//! Reading and reshaping the outcome of a chain.
//!
//! A [`Cases`] behaves like an optional value holding the committed result:
//! it can be unwrapped, mapped, filtered and iterated (at most one element).

use tracing::debug;

use crate::engine::Cases;
use crate::metrics::metrics_recorder;
use crate::types::{MatchError, MatchState};

impl<S, R> Cases<S, R> {
    /// The committed result.
    ///
    /// An unmatched chain fails with [`MatchError::NoMatch`]; a chain whose
    /// result was filtered out fails with [`MatchError::EmptyResult`].
    pub fn get(self) -> Result<R, MatchError> {
        match self.state {
            MatchState::Matched(result) => Ok(result),
            MatchState::Unmatched(_) => {
                debug!(cases = self.cases, "match_unresolved");
                if let Some(metrics) = metrics_recorder() {
                    metrics.record_miss(self.cases);
                }
                Err(MatchError::NoMatch { cases: self.cases })
            }
            MatchState::Rejected => Err(MatchError::EmptyResult),
        }
    }

    pub fn get_or_else(self, other: R) -> R {
        self.into_option().unwrap_or(other)
    }

    pub fn get_or_else_with<F>(self, supplier: F) -> R
    where
        F: FnOnce() -> R,
    {
        self.into_option().unwrap_or_else(supplier)
    }

    /// The committed result, or the error built by `factory`.
    pub fn get_or_else_throw<E, F>(self, factory: F) -> Result<R, E>
    where
        F: FnOnce() -> E,
    {
        self.into_option().ok_or_else(factory)
    }

    pub fn is_matched(&self) -> bool {
        self.state.is_matched()
    }

    /// True when there is no result to read: unmatched or filtered out.
    pub fn is_empty(&self) -> bool {
        !self.is_matched()
    }

    pub fn state(&self) -> &MatchState<S, R> {
        &self.state
    }

    pub fn into_state(self) -> MatchState<S, R> {
        self.state
    }

    /// Number of cases (including defaults) attached so far.
    pub fn cases(&self) -> usize {
        self.cases
    }

    pub fn as_option(&self) -> Option<&R> {
        self.state.result()
    }

    pub fn into_option(self) -> Option<R> {
        match self.state {
            MatchState::Matched(result) => Some(result),
            _ => None,
        }
    }

    /// Hand the whole chain to `function`.
    pub fn transform<T, F>(self, function: F) -> T
    where
        F: FnOnce(Self) -> T,
    {
        function(self)
    }

    /// Map the committed result. Unmatched and rejected chains pass through.
    pub fn map<T, F>(self, function: F) -> Cases<S, T>
    where
        F: FnOnce(R) -> T,
    {
        let state = match self.state {
            MatchState::Matched(result) => MatchState::Matched(function(result)),
            MatchState::Unmatched(subject) => MatchState::Unmatched(subject),
            MatchState::Rejected => MatchState::Rejected,
        };
        Cases {
            state,
            cases: self.cases,
        }
    }

    /// Keep the committed result only if `predicate` holds for it.
    ///
    /// A rejected result makes [`get`](Self::get) fail with
    /// [`MatchError::EmptyResult`]. Cases and defaults attached afterwards are
    /// not evaluated.
    pub fn filter<P>(mut self, predicate: P) -> Self
    where
        P: FnOnce(&R) -> bool,
    {
        let keep = match &self.state {
            MatchState::Matched(result) => predicate(result),
            _ => true,
        };
        if !keep {
            self.state = MatchState::Rejected;
        }
        self
    }

    /// Run `action` on the committed result, if any.
    pub fn peek<F>(self, action: F) -> Self
    where
        F: FnOnce(&R),
    {
        if let Some(result) = self.as_option() {
            action(result);
        }
        self
    }

    /// Iterator over the committed result: zero or one element. Each call
    /// starts a fresh iteration.
    pub fn iter(&self) -> std::option::IntoIter<&R> {
        self.as_option().into_iter()
    }
}

impl<S, R> IntoIterator for Cases<S, R> {
    type Item = R;
    type IntoIter = std::option::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_option().into_iter()
    }
}

impl<'a, S, R> IntoIterator for &'a Cases<S, R> {
    type Item = &'a R;
    type IntoIter = std::option::IntoIter<&'a R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
