use std::borrow::Borrow;

use tracing::{debug, trace};

use crate::condition;
use crate::descriptor::{Applicable, Type, TypeTag};
use crate::metrics::metrics_recorder;
use crate::types::{CaseKind, MatchError, MatchState};


/// Entry point of a matching expression.
///
/// ```
/// use matcher::Match;
///
/// let sign = Match::of(-3)
///     .when(|n: &i32| *n < 0).then("negative")
///     .when_is(0).then("zero")
///     .otherwise("positive")
///     .get();
///
/// assert_eq!(sign, Ok("negative"));
/// ```
pub struct Match;

impl Match {
    /// Open a matching expression over `subject`. Nullable subjects are
    /// `Option` subjects.
    pub fn of<S, R>(subject: S) -> Cases<S, R> {
        Cases::new(subject)
    }
}

/// A matching chain: its current [`MatchState`] plus the number of cases
/// attached so far.
///
/// Every operation takes the chain by value and returns the next one. Once a
/// case has committed, later cases and defaults are carried through without
/// evaluating their conditions or running their producers.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct Cases<S, R> {
    pub(crate) state: MatchState<S, R>,
    pub(crate) cases: usize,
}

impl<S, R> Cases<S, R> {
    pub fn new(subject: S) -> Self {
        Self {
            state: MatchState::Unmatched(subject),
            cases: 0,
        }
    }

    /// Declare the result type. Has no runtime effect.
    ///
    /// The bound only holds through the identity conversion, so this pins
    /// `R` to `T`: `Match::of(x).returns::<f64>()` reads as a declaration
    /// where `Match::of::<_, f64>(x)` would not.
    pub fn returns<T>(self) -> Cases<S, T>
    where
        Self: Into<Cases<S, T>>,
    {
        self.into()
    }

    /// Case matching a subject equal to `value`.
    pub fn when_is(self, value: S) -> When<S, R>
    where
        S: PartialEq,
    {
        let hit = self.evaluate(|subject| condition::is_equal(subject, &value));
        self.attach(CaseKind::Value, Guard::held(hit))
    }

    /// Case matching a subject equal to any of `values`.
    pub fn when_is_in<I>(self, values: I) -> When<S, R>
    where
        S: PartialEq,
        I: IntoIterator<Item = S>,
    {
        let hit = self.evaluate(|subject| condition::is_in(subject, values));
        self.attach(CaseKind::ValueSet, Guard::held(hit))
    }

    pub fn try_when_is_in<I>(self, values: Option<I>) -> Result<When<S, R>, MatchError>
    where
        S: PartialEq,
        I: IntoIterator<Item = S>,
    {
        let values = condition::require(values, "values")?;
        Ok(self.when_is_in(values))
    }

    /// Case matching when `predicate` holds for the subject. The predicate
    /// runs at most once, and only while the chain is unmatched.
    pub fn when<P>(self, predicate: P) -> When<S, R>
    where
        P: FnOnce(&S) -> bool,
    {
        let hit = self.evaluate(|subject| condition::test(subject, predicate));
        self.attach(CaseKind::Predicate, Guard::held(hit))
    }

    pub fn try_when<P>(self, predicate: Option<P>) -> Result<When<S, R>, MatchError>
    where
        P: FnOnce(&S) -> bool,
    {
        let predicate = condition::require(predicate, "predicate")?;
        Ok(self.when(predicate))
    }

    /// Case matching when `ty` narrows the subject. Producers attached with
    /// [`When::then_apply`] receive the narrowed value.
    pub fn when_type<U: ?Sized>(self, ty: &Type<S, U>) -> When<S, R, U> {
        let guard = if self.is_unmatched() {
            Guard::Narrow(ty.clone())
        } else {
            Guard::Skip
        };
        self.attach(CaseKind::Type, guard)
    }

    pub fn try_when_type<U: ?Sized>(
        self,
        ty: Option<&Type<S, U>>,
    ) -> Result<When<S, R, U>, MatchError> {
        let ty = condition::require(ty, "type")?;
        Ok(self.when_type(ty))
    }

    /// Case matching when any of `types` accepts the subject.
    pub fn when_type_in<I, T>(self, types: I) -> When<S, R>
    where
        I: IntoIterator<Item = T>,
        T: Borrow<TypeTag<S>>,
    {
        let hit = self.evaluate(|subject| condition::is_type_in(subject, types));
        self.attach(CaseKind::TypeSet, Guard::held(hit))
    }

    pub fn try_when_type_in<I, T>(self, types: Option<I>) -> Result<When<S, R>, MatchError>
    where
        I: IntoIterator<Item = T>,
        T: Borrow<TypeTag<S>>,
    {
        let types = condition::require(types, "types")?;
        Ok(self.when_type_in(types))
    }

    /// Case matching when the function's parameter type accepts the subject.
    ///
    /// Only applicability is decided here. The function runs as the producer
    /// when [`Applied::then_apply`] or [`Applied::then_run`] is attached.
    pub fn when_applicable<U, F>(mut self, function: Applicable<S, U, F>) -> Applied<S, R, U, F>
    where
        U: ?Sized,
        F: FnOnce(&U) -> R,
    {
        self.cases += 1;
        let (param, function) = function.into_parts();
        let applies = self.evaluate(|subject| condition::applicable(subject, &param).is_some());
        Applied {
            cases: self,
            param,
            function,
            applies,
        }
    }

    pub fn try_when_applicable<U, F>(
        self,
        function: Option<Applicable<S, U, F>>,
    ) -> Result<Applied<S, R, U, F>, MatchError>
    where
        U: ?Sized,
        F: FnOnce(&U) -> R,
    {
        let function = condition::require(function, "function")?;
        Ok(self.when_applicable(function))
    }

    /// Default result for an unmatched chain.
    pub fn otherwise(self, value: R) -> Self {
        self.otherwise_apply(|_| value)
    }

    pub fn otherwise_with<F>(self, supplier: F) -> Self
    where
        F: FnOnce() -> R,
    {
        self.otherwise_apply(|_| supplier())
    }

    /// Default computed from the unmatched subject.
    pub fn otherwise_apply<F>(mut self, function: F) -> Self
    where
        F: FnOnce(&S) -> R,
    {
        self.cases += 1;
        let result = self.state.subject().map(function);
        match result {
            Some(result) => self.commit(CaseKind::Otherwise, result),
            None => self,
        }
    }

    /// Fail an unmatched chain with the error built by `factory`.
    ///
    /// The error is returned as soon as this is called; a matched chain is
    /// passed through as `Ok`.
    pub fn otherwise_throw<E, F>(mut self, factory: F) -> Result<Self, E>
    where
        F: FnOnce() -> E,
    {
        self.cases += 1;
        if self.is_unmatched() {
            debug!(case = %CaseKind::Otherwise, index = self.cases, "match_case_threw");
            return Err(factory());
        }
        Ok(self)
    }

    fn is_unmatched(&self) -> bool {
        matches!(self.state, MatchState::Unmatched(_))
    }

    fn evaluate<C>(&self, condition: C) -> bool
    where
        C: FnOnce(&S) -> bool,
    {
        self.state.subject().is_some_and(condition)
    }

    fn attach<U: ?Sized>(mut self, kind: CaseKind, guard: Guard<S, U>) -> When<S, R, U> {
        self.cases += 1;
        When {
            cases: self,
            kind,
            guard,
        }
    }

    /// Move to `Matched`. Callers only reach this from the unmatched state.
    fn commit(mut self, kind: CaseKind, result: R) -> Self {
        trace!(case = %kind, index = self.cases, "match_case_committed");
        if let Some(metrics) = metrics_recorder() {
            metrics.record_commit(kind, self.cases);
        }
        self.state = MatchState::Matched(result);
        self
    }
}

impl<S> Cases<S, ()> {
    /// Default action for an unmatched chain.
    pub fn otherwise_run<F>(self, action: F) -> Self
    where
        F: FnOnce(),
    {
        self.otherwise_apply(|_| action())
    }

    /// Default action receiving the unmatched subject.
    pub fn otherwise_accept<F>(self, action: F) -> Self
    where
        F: FnOnce(&S),
    {
        self.otherwise_apply(action)
    }
}

/// How a pending case reaches its producer.
enum Guard<S, U: ?Sized> {
    /// Chain already decided, or the condition failed.
    Skip,
    /// Condition held; producers see the subject through `pass`.
    Pass(fn(&S) -> Option<&U>),
    /// Type case; the descriptor narrows the subject when a producer attaches.
    Narrow(Type<S, U>),
}

impl<S> Guard<S, S> {
    fn held(hit: bool) -> Self {
        if hit {
            Guard::Pass(pass)
        } else {
            Guard::Skip
        }
    }
}

fn pass<S>(subject: &S) -> Option<&S> {
    Some(subject)
}

impl<S, U: ?Sized> Guard<S, U> {
    fn narrow<'s>(&self, subject: &'s S) -> Option<&'s U> {
        match self {
            Guard::Skip => None,
            Guard::Pass(through) => through(subject),
            Guard::Narrow(ty) => ty.narrow(subject),
        }
    }
}

/// A case whose condition has been evaluated, waiting for its producer.
///
/// `U` is what typed producers receive: the subject itself for value,
/// predicate and type-set cases, the narrowed value for a type case.
#[must_use = "a case does nothing until a producer is attached"]
pub struct When<S, R, U: ?Sized = S> {
    cases: Cases<S, R>,
    kind: CaseKind,
    guard: Guard<S, U>,
}

impl<S, R, U: ?Sized> When<S, R, U> {
    /// Commit `value` when the case matches.
    pub fn then(self, value: R) -> Cases<S, R> {
        self.commit_with(|_| value)
    }

    /// Commit the supplier's value when the case matches. The supplier is not
    /// called otherwise.
    pub fn then_with<F>(self, supplier: F) -> Cases<S, R>
    where
        F: FnOnce() -> R,
    {
        self.commit_with(|_| supplier())
    }

    /// Commit a value computed from the (narrowed) subject.
    pub fn then_apply<F>(self, function: F) -> Cases<S, R>
    where
        F: FnOnce(&U) -> R,
    {
        self.commit_with(function)
    }

    /// Fail with the error built by `factory` when the case matches.
    ///
    /// The error is returned immediately rather than at the end of the chain;
    /// an `Ok` chain continues as usual.
    pub fn then_throw<E, F>(self, factory: F) -> Result<Cases<S, R>, E>
    where
        F: FnOnce() -> E,
    {
        let When { cases, kind, guard } = self;
        let hit = cases
            .state
            .subject()
            .is_some_and(|subject| guard.narrow(subject).is_some());
        if hit {
            debug!(case = %kind, index = cases.cases, "match_case_threw");
            return Err(factory());
        }
        Ok(cases)
    }

    fn commit_with<F>(self, producer: F) -> Cases<S, R>
    where
        F: FnOnce(&U) -> R,
    {
        let When { cases, kind, guard } = self;
        let result = match &cases.state {
            MatchState::Unmatched(subject) => guard.narrow(subject).map(producer),
            _ => None,
        };
        match result {
            Some(result) => cases.commit(kind, result),
            None => cases,
        }
    }
}

impl<S, U: ?Sized> When<S, (), U> {
    /// Run `action` when the case matches.
    pub fn then_run<F>(self, action: F) -> Cases<S, ()>
    where
        F: FnOnce(),
    {
        self.commit_with(|_| action())
    }

    /// Run `action` on the (narrowed) subject when the case matches.
    pub fn then_accept<F>(self, action: F) -> Cases<S, ()>
    where
        F: FnOnce(&U),
    {
        self.commit_with(action)
    }
}

/// An applicable-function case. The function runs at most once, and only
/// through [`then_apply`](Self::then_apply) or [`then_run`](Self::then_run).
#[must_use = "a case does nothing until a producer is attached"]
pub struct Applied<S, R, U: ?Sized, F> {
    cases: Cases<S, R>,
    param: Type<S, U>,
    function: F,
    applies: bool,
}

impl<S, R, U, F> Applied<S, R, U, F>
where
    U: ?Sized,
    F: FnOnce(&U) -> R,
{
    /// Commit the function's return value when it applies.
    pub fn then_apply(self) -> Cases<S, R> {
        let Applied {
            cases,
            param,
            function,
            applies,
        } = self;
        let result = match &cases.state {
            MatchState::Unmatched(subject) if applies => {
                condition::applicable(subject, &param).map(function)
            }
            _ => None,
        };
        match result {
            Some(result) => cases.commit(CaseKind::Applicable, result),
            None => cases,
        }
    }

    /// Fail with the error built by `factory` if the function applies. The
    /// function itself is not called.
    pub fn then_throw<E, G>(self, factory: G) -> Result<Cases<S, R>, E>
    where
        G: FnOnce() -> E,
    {
        if self.applies {
            debug!(case = %CaseKind::Applicable, index = self.cases.cases, "match_case_threw");
            return Err(factory());
        }
        Ok(self.cases)
    }
}

impl<S, U, F> Applied<S, (), U, F>
where
    U: ?Sized,
    F: FnOnce(&U),
{
    /// Run the applicable action and commit its unit result.
    pub fn then_run(self) -> Cases<S, ()> {
        self.then_apply()
    }
}
