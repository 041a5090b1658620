//! Case conditions over the subject.
//!
//! Every evaluator is a pure function of the subject and the case argument.
//! Absent arguments are rejected by [`require`] before any evaluation.

use std::borrow::Borrow;

use crate::descriptor::{Type, TypeTag};
use crate::types::MatchError;

/// Structural equality. For `Option` subjects, `None` equals `None`.
pub fn is_equal<S: PartialEq>(subject: &S, value: &S) -> bool {
    subject == value
}

/// Equality against any of `values`. An empty set never matches.
pub fn is_in<S, I>(subject: &S, values: I) -> bool
where
    S: PartialEq,
    I: IntoIterator<Item = S>,
{
    values.into_iter().any(|value| value == *subject)
}

pub fn test<S: ?Sized, P>(subject: &S, predicate: P) -> bool
where
    P: FnOnce(&S) -> bool,
{
    predicate(subject)
}

pub fn is_type<S: ?Sized, U: ?Sized>(subject: &S, ty: &Type<S, U>) -> bool {
    ty.accepts(subject)
}

/// True when any tag accepts the subject. An empty set never matches.
pub fn is_type_in<S, I, T>(subject: &S, types: I) -> bool
where
    S: ?Sized,
    I: IntoIterator<Item = T>,
    T: Borrow<TypeTag<S>>,
{
    types.into_iter().any(|tag| tag.borrow().accepts(subject))
}

/// The narrowed argument for a function with parameter type `param`, if the
/// function is applicable to `subject`.
pub fn applicable<'s, S: ?Sized, U: ?Sized>(subject: &'s S, param: &Type<S, U>) -> Option<&'s U> {
    param.narrow(subject)
}

/// Unwrap a case argument that may be absent.
pub fn require<T>(argument: Option<T>, name: &'static str) -> Result<T, MatchError> {
    argument.ok_or(MatchError::null_argument(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Token {
        Int(i64),
        Float(f64),
        Word(String),
    }

    fn number() -> Type<Token, Token> {
        Type::new("number", |token| match token {
            Token::Int(_) | Token::Float(_) => Some(token),
            Token::Word(_) => None,
        })
    }

    fn int() -> Type<Token, i64> {
        Type::new("int", |token| match token {
            Token::Int(n) => Some(n),
            _ => None,
        })
    }

    #[test]
    fn equality_includes_absent_values() {
        assert!(is_equal(&None::<i32>, &None));
        assert!(is_equal(&Some(2), &Some(2)));
        assert!(!is_equal(&Some(2), &None));
    }

    #[test]
    fn set_membership() {
        assert!(is_in(&2, [1, 2, 3]));
        assert!(!is_in(&4, [1, 2, 3]));
        assert!(!is_in(&4, Vec::<i32>::new()));
        assert!(is_in(&None::<i32>, [Some(1), None]));
    }

    #[test]
    fn predicate_sees_raw_subject() {
        assert!(test(&0, |n: &i32| n % 2 == 0));
        assert!(!test(&1, |n: &i32| n % 2 == 0));
    }

    #[test]
    fn type_tests_follow_the_hierarchy() {
        let one = Token::Int(1);
        let half = Token::Float(0.5);
        let word = Token::Word("x".into());

        assert!(is_type(&one, &number()));
        assert!(is_type(&one, &int()));
        assert!(is_type(&half, &number()));
        assert!(!is_type(&half, &int()));
        assert!(!is_type(&word, &number()));
    }

    #[test]
    fn type_set_matches_any_member() {
        let tags = [int().tag(), number().tag()];
        assert!(is_type_in(&Token::Float(1.0), &tags));
        assert!(!is_type_in(&Token::Word("y".into()), &tags));
        assert!(!is_type_in(&Token::Int(1), Vec::<TypeTag<Token>>::new()));
    }

    #[test]
    fn applicable_returns_narrowed_argument() {
        assert_eq!(applicable(&Token::Int(9), &int()), Some(&9));
        assert_eq!(applicable(&Token::Float(9.0), &int()), None);
    }

    #[test]
    fn require_rejects_absent_argument() {
        assert_eq!(require(Some(3), "values"), Ok(3));
        assert_eq!(
            require(None::<i32>, "values"),
            Err(MatchError::NullArgument { argument: "values" })
        );
    }
}
