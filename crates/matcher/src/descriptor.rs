//! Type descriptors used by the `when_type*` and `when_applicable` cases.
//!
//! Rust has no runtime "instance of" check for arbitrary values, so a type
//! test is expressed as an explicit narrowing function:
//!
//! - For closed subject shapes (enums), a [`Type`] narrows the subject to the
//!   variants it accepts. Supertypes are descriptors that accept more
//!   variants than their subtypes, e.g. `number` vs `integer`.
//! - For open subject shapes (`Box<dyn Any>`, `Arc<dyn Any + Send + Sync>`,
//!   ...), [`Type::downcast`] narrows by `TypeId` through the [`Dynamic`]
//!   trait, and [`Type::any_of`] groups concrete types under a common name.
//! - [`TypeRegistry`] maps type names to erased [`TypeTag`]s for callers that
//!   resolve types at runtime (configuration files, scripting front ends).
//!
//! ```
//! use matcher::Type;
//!
//! enum Shape {
//!     Circle(f64),
//!     Square(f64),
//! }
//!
//! let circle: Type<Shape, f64> = Type::new("circle", |shape| match shape {
//!     Shape::Circle(radius) => Some(radius),
//!     _ => None,
//! });
//!
//! assert_eq!(circle.narrow(&Shape::Circle(2.0)), Some(&2.0));
//! assert!(!circle.accepts(&Shape::Square(1.0)));
//! ```

use std::any::{type_name, Any};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

type NarrowFn<S, U> = dyn Fn(&S) -> Option<&U> + Send + Sync;
type AcceptFn<S> = dyn Fn(&S) -> bool + Send + Sync;

/// A named narrowing from a subject `S` to the part of it typed as `U`.
///
/// `narrow` returning `Some` is the "subject is an instance of this type"
/// test; the returned reference is what typed producers receive.
pub struct Type<S: ?Sized, U: ?Sized> {
    name: Cow<'static, str>,
    narrow: Arc<NarrowFn<S, U>>,
}

impl<S: ?Sized, U: ?Sized> Type<S, U> {
    /// Descriptor from an explicit narrowing function.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, narrow: F) -> Self
    where
        F: Fn(&S) -> Option<&U> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            narrow: Arc::new(narrow),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Narrow `subject` to `U`, or `None` when the subject is not of this type.
    pub fn narrow<'s>(&self, subject: &'s S) -> Option<&'s U> {
        (self.narrow)(subject)
    }

    pub fn accepts(&self, subject: &S) -> bool {
        self.narrow(subject).is_some()
    }

    /// Erase the target type so the descriptor can join a type set.
    pub fn tag(&self) -> TypeTag<S>
    where
        S: 'static,
        U: 'static,
    {
        let narrow = Arc::clone(&self.narrow);
        TypeTag {
            name: self.name.clone(),
            accepts: Arc::new(move |subject: &S| narrow(subject).is_some()),
        }
    }

    /// Rename the descriptor, keeping its narrowing.
    pub fn named(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            narrow: self.narrow,
        }
    }
}

impl<S: ?Sized + 'static> Type<S, S> {
    /// Supertype accepting every subject accepted by any of `members`.
    ///
    /// The narrowed value is the subject itself, so producers see the
    /// common type rather than a member's target type.
    pub fn any_of<I>(name: impl Into<Cow<'static, str>>, members: I) -> Self
    where
        I: IntoIterator<Item = TypeTag<S>>,
    {
        let members: Vec<TypeTag<S>> = members.into_iter().collect();
        Self::new(name, move |subject: &S| {
            members
                .iter()
                .any(|member| member.accepts(subject))
                .then_some(subject)
        })
    }
}

impl<S, U> Type<S, U>
where
    S: Dynamic + ?Sized + 'static,
    U: Any,
{
    /// Descriptor for the concrete type `U` behind a dynamically typed subject.
    pub fn downcast() -> Self {
        Self::new(type_name::<U>(), |subject: &S| {
            subject.as_any()?.downcast_ref::<U>()
        })
    }
}

impl<S: ?Sized, U: ?Sized> Clone for Type<S, U> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            narrow: Arc::clone(&self.narrow),
        }
    }
}

impl<S: ?Sized, U: ?Sized> fmt::Debug for Type<S, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Type").field(&self.name).finish()
    }
}

/// A type descriptor with its target type erased: a named boolean test.
pub struct TypeTag<S: ?Sized> {
    name: Cow<'static, str>,
    accepts: Arc<AcceptFn<S>>,
}

impl<S: ?Sized> TypeTag<S> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, accepts: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            accepts: Arc::new(accepts),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, subject: &S) -> bool {
        (self.accepts)(subject)
    }
}

impl<S, U> From<Type<S, U>> for TypeTag<S>
where
    S: ?Sized + 'static,
    U: ?Sized + 'static,
{
    fn from(ty: Type<S, U>) -> Self {
        ty.tag()
    }
}

impl<S, U> From<&Type<S, U>> for TypeTag<S>
where
    S: ?Sized + 'static,
    U: ?Sized + 'static,
{
    fn from(ty: &Type<S, U>) -> Self {
        ty.tag()
    }
}

impl<S: ?Sized> Clone for TypeTag<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            accepts: Arc::clone(&self.accepts),
        }
    }
}

impl<S: ?Sized> fmt::Debug for TypeTag<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeTag").field(&self.name).finish()
    }
}

/// A unary function paired with the descriptor of its parameter type.
///
/// The function is applicable to a subject when the descriptor narrows it;
/// it then runs as the case's producer.
pub struct Applicable<S: ?Sized, U: ?Sized, F> {
    param: Type<S, U>,
    function: F,
}

impl<S: ?Sized, U: ?Sized, F> Applicable<S, U, F> {
    pub fn new(param: Type<S, U>, function: F) -> Self {
        Self { param, function }
    }

    pub fn param(&self) -> &Type<S, U> {
        &self.param
    }

    pub(crate) fn into_parts(self) -> (Type<S, U>, F) {
        (self.param, self.function)
    }
}

impl<S, U, F> Applicable<S, U, F>
where
    S: Dynamic + ?Sized + 'static,
    U: Any,
{
    /// Applicable function whose parameter type is read off the closure:
    /// `Applicable::downcast(|n: &i32| n + 1)` applies to subjects holding
    /// an `i32`.
    pub fn downcast<R>(function: F) -> Self
    where
        F: FnOnce(&U) -> R,
    {
        Self::new(Type::downcast(), function)
    }
}

impl<S: ?Sized, U: ?Sized, F> fmt::Debug for Applicable<S, U, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Applicable")
            .field("param", &self.param)
            .finish_non_exhaustive()
    }
}

/// Subjects whose concrete type is only known at runtime.
///
/// `as_any` returns `None` for an absent value (`Option::None`), which makes
/// a null subject inapplicable to every downcast descriptor.
pub trait Dynamic {
    fn as_any(&self) -> Option<&dyn Any>;
}

impl Dynamic for dyn Any {
    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Dynamic for dyn Any + Send {
    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Dynamic for dyn Any + Send + Sync {
    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl<T: Dynamic + ?Sized> Dynamic for Box<T> {
    fn as_any(&self) -> Option<&dyn Any> {
        (**self).as_any()
    }
}

impl<T: Dynamic + ?Sized> Dynamic for Rc<T> {
    fn as_any(&self) -> Option<&dyn Any> {
        (**self).as_any()
    }
}

impl<T: Dynamic + ?Sized> Dynamic for Arc<T> {
    fn as_any(&self) -> Option<&dyn Any> {
        (**self).as_any()
    }
}

impl<T: Dynamic + ?Sized> Dynamic for &T {
    fn as_any(&self) -> Option<&dyn Any> {
        (**self).as_any()
    }
}

impl<T: Dynamic> Dynamic for Option<T> {
    fn as_any(&self) -> Option<&dyn Any> {
        self.as_ref().and_then(Dynamic::as_any)
    }
}

/// Type tags addressable by name.
pub struct TypeRegistry<S: ?Sized> {
    types: BTreeMap<String, TypeTag<S>>,
}

impl<S: ?Sized> TypeRegistry<S> {
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Register `tag` under its own name, replacing any previous entry.
    pub fn register(&mut self, tag: TypeTag<S>) -> &mut Self {
        self.types.insert(tag.name().to_string(), tag);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, tag: impl Into<TypeTag<S>>) -> Self {
        self.register(tag.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeTag<S>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<S: ?Sized> Default for TypeRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> Clone for TypeRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            types: self.types.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for TypeRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.types.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type AnyBox = Box<dyn Any + Send + Sync>;

    fn number() -> Type<AnyBox, AnyBox> {
        Type::any_of(
            "number",
            [
                Type::<AnyBox, i32>::downcast().tag(),
                Type::<AnyBox, i64>::downcast().tag(),
                Type::<AnyBox, f64>::downcast().tag(),
            ],
        )
    }

    #[test]
    fn downcast_narrows_to_concrete_type() {
        let int = Type::<AnyBox, i32>::downcast();
        let subject: AnyBox = Box::new(7_i32);

        assert_eq!(int.narrow(&subject), Some(&7));
        assert!(!Type::<AnyBox, String>::downcast().accepts(&subject));
        assert_eq!(int.name(), "i32");
    }

    #[test]
    fn absent_dynamic_subject_is_never_accepted() {
        let int = Type::<Option<AnyBox>, i32>::downcast();

        assert!(!int.accepts(&None));
        assert!(int.accepts(&Some(Box::new(1_i32) as AnyBox)));
    }

    #[test]
    fn supertype_accepts_every_member() {
        let number = number();

        assert!(number.accepts(&(Box::new(1_i32) as AnyBox)));
        assert!(number.accepts(&(Box::new(2.5_f64) as AnyBox)));
        assert!(!number.accepts(&(Box::new("1") as AnyBox)));
    }

    #[test]
    fn tag_keeps_name_and_test() {
        let tag: TypeTag<AnyBox> = Type::<AnyBox, bool>::downcast().named("boolean").into();

        assert_eq!(tag.name(), "boolean");
        assert!(tag.accepts(&(Box::new(true) as AnyBox)));
        assert!(!tag.accepts(&(Box::new(1_u8) as AnyBox)));
    }

    #[test]
    fn registry_resolves_by_name() {
        let registry: TypeRegistry<AnyBox> = TypeRegistry::new()
            .with(number())
            .with(Type::<AnyBox, String>::downcast().named("string"));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), ["number", "string"]);

        let string = registry.get("string").expect("string registered");
        assert!(string.accepts(&(Box::new(String::from("x")) as AnyBox)));
        assert!(registry.get("object").is_none());
    }

    #[test]
    fn applicable_reads_param_type_from_closure() {
        let applicable = Applicable::<AnyBox, _, _>::downcast(|n: &i32| n + 1);
        let (param, function) = applicable.into_parts();
        let subject: AnyBox = Box::new(41_i32);

        let narrowed = param.narrow(&subject).expect("i32 subject");
        assert_eq!(function(narrowed), 42);
    }
}
