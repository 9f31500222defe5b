//! Standard argument verifiers.
//!
//! Plain predicates can be passed straight to [`Action::verify`]:
//!
//! ```rust,ignore
//! Action::new("mult", mult)
//!     .needs(["list", "factor"])
//!     .verify("list", is_array)
//!     .verify("factor", is_numeric);
//! ```
//!
//! The combinators build new predicates out of existing ones.
//!
//! [`Action::verify`]: logica_core::Action::verify

use logica_core::{Value, Verifier};

/// JSON array.
pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

/// JSON object.
pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

/// JSON string.
pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

/// JSON boolean.
pub fn is_bool(value: &Value) -> bool {
    value.is_boolean()
}

/// JSON `null`.
pub fn is_null(value: &Value) -> bool {
    value.is_null()
}

/// JSON number.
pub fn is_number(value: &Value) -> bool {
    value.is_number()
}

/// JSON number without a fractional part.
pub fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

/// A number, or a string holding a finite number such as `"2"` or `"-1.5"`.
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && s.parse::<f64>().is_ok_and(f64::is_finite)
        }
        _ => false,
    }
}

/// Anything but `null`, `""`, `[]` or `{}`.
pub fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// A number within `min..=max`.
pub fn in_range(min: f64, max: f64) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value: &Value| value.as_f64().is_some_and(|n| n >= min && n <= max)
}

/// One of the listed values.
pub fn one_of<I, V>(allowed: I) -> impl Fn(&Value) -> bool + Send + Sync + 'static
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    move |value: &Value| allowed.contains(value)
}

/// Inverts a verifier.
pub fn not<V: Verifier>(verifier: V) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value: &Value| !verifier.verify(value)
}

/// Accepts when every verifier accepts.
pub fn all_of(verifiers: Vec<Box<dyn Verifier>>) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value: &Value| verifiers.iter().all(|v| v.verify(value))
}

/// Accepts when any verifier accepts.
pub fn any_of(verifiers: Vec<Box<dyn Verifier>>) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value: &Value| verifiers.iter().any(|v| v.verify(value))
}

/// An array whose every element passes `verifier`.
pub fn each<V: Verifier>(verifier: V) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value: &Value| {
        value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| verifier.verify(item)))
    }
}
