//! Type descriptors over [`serde_json::Value`] subjects.
//!
//! JSON has a closed set of shapes, so each descriptor narrows a `Value` to
//! the payload of one variant. `integer` and `float` are subtypes of
//! `number`: every value accepted by either is also a `number`.

use matcher::{Type, TypeRegistry};
use serde_json::{Map, Number, Value};

/// Names registered by [`json_types`], in registration order.
pub const TYPE_NAMES: [&str; 8] = [
    "null", "bool", "number", "integer", "float", "string", "array", "object",
];

pub fn null() -> Type<Value, Value> {
    Type::new("null", |value: &Value| value.is_null().then_some(value))
}

pub fn boolean() -> Type<Value, bool> {
    Type::new("bool", |value: &Value| match value {
        Value::Bool(flag) => Some(flag),
        _ => None,
    })
}

pub fn number() -> Type<Value, Number> {
    Type::new("number", |value: &Value| match value {
        Value::Number(n) => Some(n),
        _ => None,
    })
}

/// Numbers without a fractional representation (`i64` or `u64`).
pub fn integer() -> Type<Value, Number> {
    Type::new("integer", |value: &Value| match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n),
        _ => None,
    })
}

pub fn float() -> Type<Value, Number> {
    Type::new("float", |value: &Value| match value {
        Value::Number(n) if n.is_f64() => Some(n),
        _ => None,
    })
}

pub fn string() -> Type<Value, str> {
    Type::new("string", Value::as_str)
}

pub fn array() -> Type<Value, Vec<Value>> {
    Type::new("array", Value::as_array)
}

pub fn object() -> Type<Value, Map<String, Value>> {
    Type::new("object", Value::as_object)
}

/// Registry of every JSON descriptor, keyed by the names in [`TYPE_NAMES`].
pub fn json_types() -> TypeRegistry<Value> {
    TypeRegistry::new()
        .with(null())
        .with(boolean())
        .with(number())
        .with(integer())
        .with(float())
        .with(string())
        .with(array())
        .with(object())
}
