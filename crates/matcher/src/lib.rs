//! # Case matching (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` evaluates a single subject value against an ordered list of
//! cases and yields the result of the first case whose condition holds.
//! Cases are attached with a fluent builder; once one commits, every later
//! case is carried through without evaluating its condition or running its
//! producer. The outcome behaves like an optional value: it can be unwrapped,
//! defaulted, mapped, filtered and iterated.
//!
//! ## Core Types
//!
//! - [`Match`]: entry point, `Match::of(subject)`.
//! - [`Cases`]: the running chain. Case attachment (`when_is`, `when_is_in`,
//!   `when`, `when_type`, `when_type_in`, `when_applicable`), defaults
//!   (`otherwise*`) and result access (`get`, `get_or_else`, `map`, `filter`,
//!   `iter`, ...) all live here.
//! - [`When`] / [`Applied`]: a case whose condition has been evaluated,
//!   waiting for its producer (`then`, `then_with`, `then_apply`,
//!   `then_throw`, `then_run`, `then_accept`).
//! - [`MatchState`]: `Unmatched(subject)`, `Matched(result)` or `Rejected`.
//! - [`Type`], [`TypeTag`], [`TypeRegistry`], [`Applicable`], [`Dynamic`]:
//!   runtime type tests for type and applicable-function cases.
//! - [`MatchError`]: absent case argument, no case matched, filtered result.
//!
//! Nullable subjects are `Option` subjects: `when_is(None)` matches an
//! absent subject, and downcast descriptors never accept one.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{Match, MatchError, Type};
//!
//! #[derive(Debug, PartialEq)]
//! enum Token {
//!     Int(i64),
//!     Word(String),
//! }
//!
//! let int: Type<Token, i64> = Type::new("int", |token| match token {
//!     Token::Int(n) => Some(n),
//!     _ => None,
//! });
//!
//! let describe = |token: Token| {
//!     Match::of(token)
//!         .when_is(Token::Int(0)).then("zero".to_string())
//!         .when_type(&int).then_apply(|n| format!("int {n}"))
//!         .get()
//! };
//!
//! assert_eq!(describe(Token::Int(0)), Ok("zero".to_string()));
//! assert_eq!(describe(Token::Int(7)), Ok("int 7".to_string()));
//! assert_eq!(
//!     describe(Token::Word("x".into())),
//!     Err(MatchError::NoMatch { cases: 2 })
//! );
//! ```
//!
//! ## Observability
//!
//! Commits are traced as `match_case_committed` events and unresolved chains
//! as `match_unresolved`. Install a [`MatchMetrics`] implementation via
//! [`set_match_metrics`] to count them; this is typically done once during
//! startup.

pub mod condition;
pub mod descriptor;
pub mod engine;
pub mod metrics;
pub mod types;
mod value;

pub use crate::descriptor::{Applicable, Dynamic, Type, TypeRegistry, TypeTag};
pub use crate::engine::{Applied, Cases, Match, When};
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::types::{CaseKind, MatchError, MatchState};
