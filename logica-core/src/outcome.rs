//! # Outcome and the capture protocol
//!
//! Every action invocation produces exactly one [`Outcome`]: either the
//! handler's value or the [`DomainError`] it raised. Defects never become an
//! `Outcome`; [`capture`] hands them back as `Err`.
//!
//! Handlers may return a plain value or an `Outcome` obtained from a sibling
//! call. The latter is passed through untouched, so forwarding a nested call
//! never double-wraps it.

use crate::{
    action::Context,
    error::{DomainError, Fault, LogicError},
    value::{Map, Value},
};
use serde::Serialize;

/// The uniform success/failure result of an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    state: Result<Value, DomainError>,
}

impl Outcome {
    /// A successful outcome carrying `value`.
    pub fn success(value: impl Into<Value>) -> Self {
        Self {
            state: Ok(value.into()),
        }
    }

    /// A failed outcome carrying `error`.
    pub fn failure(error: DomainError) -> Self {
        Self { state: Err(error) }
    }

    /// Whether no failure was captured.
    pub fn is_success(&self) -> bool {
        self.state.is_ok()
    }

    /// Whether a domain failure was captured.
    pub fn is_failed(&self) -> bool {
        self.state.is_err()
    }

    /// The value, present iff successful.
    pub fn value(&self) -> Option<&Value> {
        self.state.as_ref().ok()
    }

    /// Take the value, present iff successful.
    pub fn into_value(self) -> Option<Value> {
        self.state.ok()
    }

    /// The failure key, present iff failed.
    pub fn key(&self) -> Option<&str> {
        self.cause().map(DomainError::key)
    }

    /// The failure message, present iff failed.
    pub fn message(&self) -> Option<&str> {
        self.cause().map(DomainError::message)
    }

    /// Alias for [`message`](Self::message).
    pub fn error(&self) -> Option<&str> {
        self.message()
    }

    /// The original failure, present iff failed.
    pub fn cause(&self) -> Option<&DomainError> {
        self.state.as_ref().err()
    }

    /// Convert into a plain `Result`.
    pub fn into_result(self) -> Result<Value, DomainError> {
        self.state
    }
}

impl From<&Outcome> for bool {
    fn from(outcome: &Outcome) -> Self {
        outcome.is_success()
    }
}

impl From<Result<Value, DomainError>> for Outcome {
    fn from(state: Result<Value, DomainError>) -> Self {
        Self { state }
    }
}

/// What a handler hands back on success.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A plain value, wrapped into a successful `Outcome`.
    Value(Value),
    /// An already-formed outcome, returned as is.
    Outcome(Outcome),
}

impl Reply {
    /// Serialize an arbitrary type into a value reply.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, Fault> {
        serde_json::to_value(value)
            .map(Reply::Value)
            .map_err(Fault::defect)
    }
}

/// Conversion of a handler's output into a [`Reply`].
///
/// # Default Implementations
///
/// - `Outcome` → passed through unchanged
/// - `()` → `null`
/// - `Option<T>` → `T` or `null`
/// - scalars, strings, `Value`, `Map`, `Vec<T: Into<Value>>` → value
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a logic action",
    label = "missing `IntoReply` implementation",
    note = "Return a `Value`, an `Outcome`, or use `Reply::serialize`."
)]
pub trait IntoReply {
    /// Perform the conversion.
    fn into_reply(self) -> Reply;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Reply {
        self
    }
}

impl IntoReply for Outcome {
    fn into_reply(self) -> Reply {
        Reply::Outcome(self)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Reply {
        Reply::Value(self)
    }
}

impl IntoReply for Map<String, Value> {
    fn into_reply(self) -> Reply {
        Reply::Value(Value::Object(self))
    }
}

impl IntoReply for () {
    fn into_reply(self) -> Reply {
        Reply::Value(Value::Null)
    }
}

impl IntoReply for &str {
    fn into_reply(self) -> Reply {
        Reply::Value(Value::from(self))
    }
}

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Reply {
        match self {
            Some(t) => t.into_reply(),
            None => Reply::Value(Value::Null),
        }
    }
}

impl<T: Into<Value>> IntoReply for Vec<T> {
    fn into_reply(self) -> Reply {
        Reply::Value(Value::from(self))
    }
}

macro_rules! impl_into_reply_scalar {
    ($($T:ty),+) => {
        $(
            impl IntoReply for $T {
                fn into_reply(self) -> Reply {
                    Reply::Value(Value::from(self))
                }
            }
        )+
    };
}

impl_into_reply_scalar!(bool, String, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Run `handler` and normalize what happened into an [`Outcome`].
///
/// Domain failures become failed outcomes; defects are returned as `Err`.
pub fn capture<M, F, Out>(handler: F, cx: &Context<'_, M>) -> Result<Outcome, LogicError>
where
    F: FnOnce(&Context<'_, M>) -> Result<Out, Fault>,
    Out: IntoReply,
{
    match handler(cx) {
        Ok(out) => Ok(match out.into_reply() {
            Reply::Outcome(outcome) => outcome,
            Reply::Value(value) => Outcome::success(value),
        }),
        Err(Fault::Domain(error)) => {
            #[cfg(feature = "tracing")]
            {
                tracing::debug!(key = error.key(), message = error.message(), "domain failure captured");
            }
            Ok(Outcome::failure(error))
        }
        Err(Fault::Defect(defect)) => Err(defect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Args;
    use serde_json::json;

    struct Bare;

    fn run<Out: IntoReply>(
        handler: impl FnOnce(&Context<'_, Bare>) -> Result<Out, Fault>,
    ) -> Result<Outcome, LogicError> {
        let args = Args::new();
        capture(handler, &Context::new(&Bare, &args))
    }

    #[test]
    fn test_plain_value_succeeds() {
        let outcome = run(|_| Ok(46)).unwrap();
        assert!(outcome.is_success());
        assert!(bool::from(&outcome));
        assert_eq!(outcome.value(), Some(&json!(46)));
        assert_eq!(outcome.key(), None);
        assert_eq!(outcome.message(), None);
        assert!(outcome.cause().is_none());
    }

    #[test]
    fn test_domain_failure_is_captured() {
        let outcome = run(|_| -> Result<(), Fault> {
            Err(DomainError::new("fookey", "The Foo was: Fnord").into())
        })
        .unwrap();
        assert!(outcome.is_failed());
        assert!(!bool::from(&outcome));
        assert_eq!(outcome.value(), None);
        assert_eq!(outcome.key(), Some("fookey"));
        assert!(outcome.error().unwrap().contains("Fnord"));
    }

    #[test]
    fn test_defect_propagates() {
        let result = run(|_| -> Result<(), Fault> { Err(LogicError::NameRequired.into()) });
        assert!(matches!(result, Err(LogicError::NameRequired)));
    }

    #[test]
    fn test_nested_outcome_is_not_rewrapped() {
        let inner = Outcome::failure(DomainError::new("inner", "nested"));
        let expected = inner.clone();
        let outcome = run(move |_| Ok(inner)).unwrap();
        assert_eq!(outcome, expected);

        let inner = Outcome::success(json!([1, 2]));
        let outcome = run(|_| Ok(inner.clone())).unwrap();
        assert_eq!(outcome.value(), Some(&json!([1, 2])));
    }

    #[test]
    fn test_reply_conversions() {
        assert_eq!(().into_reply(), Reply::Value(Value::Null));
        assert_eq!(None::<i32>.into_reply(), Reply::Value(Value::Null));
        assert_eq!(vec![2, 4, 6].into_reply(), Reply::Value(json!([2, 4, 6])));
        assert_eq!("hi".into_reply(), Reply::Value(json!("hi")));

        #[derive(Serialize)]
        struct Point {
            x: i32,
        }
        assert_eq!(
            Reply::serialize(&Point { x: 1 }).unwrap(),
            Reply::Value(json!({"x": 1}))
        );
    }
}
