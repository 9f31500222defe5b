//! Testing utilities for Logica.
//!
//! - [`OutcomeExt`]: unwrap an [`Outcome`] with a readable panic message
//! - [`CallResultExt`]: split `Result<Outcome, LogicError>` into outcome or defect
//! - [`RecordingVerifier`]: a verifier that records every value it checks

use logica_core::{DomainError, LogicError, Outcome, Value, Verifier};
use std::sync::{Arc, Mutex, PoisonError};

/// Assertions on a single [`Outcome`].
pub trait OutcomeExt {
    /// The success value; panics on failure.
    fn expect_value(self) -> Value;

    /// The domain failure; panics on success.
    fn expect_failure(self) -> DomainError;
}

impl OutcomeExt for Outcome {
    #[track_caller]
    fn expect_value(self) -> Value {
        match self.into_result() {
            Ok(value) => value,
            Err(err) => panic!("expected a successful outcome, got failure {err}"),
        }
    }

    #[track_caller]
    fn expect_failure(self) -> DomainError {
        match self.into_result() {
            Ok(value) => panic!("expected a failed outcome, got value {value}"),
            Err(err) => err,
        }
    }
}

/// Assertions on the result of an action call.
pub trait CallResultExt {
    /// The outcome; panics on a defect.
    fn expect_outcome(self) -> Outcome;

    /// The defect; panics when an outcome was produced.
    fn expect_defect(self) -> LogicError;
}

impl CallResultExt for Result<Outcome, LogicError> {
    #[track_caller]
    fn expect_outcome(self) -> Outcome {
        match self {
            Ok(outcome) => outcome,
            Err(err) => panic!("expected an outcome, got defect: {err}"),
        }
    }

    #[track_caller]
    fn expect_defect(self) -> LogicError {
        match self {
            Ok(outcome) => panic!("expected a defect, got outcome {outcome:?}"),
            Err(err) => err,
        }
    }
}

/// A verifier that records every value it is handed.
///
/// Clones share the same record, so keep one clone for inspection and give
/// the other to the action.
///
/// ```rust,ignore
/// let recorder = RecordingVerifier::accepting();
/// let action = Action::new("a", handler).verify_with("x", recorder.clone());
/// action.execute(&module, &args! { "x" => 1 })?;
/// assert_eq!(recorder.values(), vec![json!(1)]);
/// ```
#[derive(Clone)]
pub struct RecordingVerifier {
    values: Arc<Mutex<Vec<Value>>>,
    verdict: bool,
}

impl RecordingVerifier {
    /// A recorder that accepts everything.
    pub fn accepting() -> Self {
        Self::with_verdict(true)
    }

    /// A recorder that rejects everything.
    pub fn rejecting() -> Self {
        Self::with_verdict(false)
    }

    /// A recorder that always answers `verdict`.
    pub fn with_verdict(verdict: bool) -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
            verdict,
        }
    }

    /// The recorded values, in call order.
    pub fn values(&self) -> Vec<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of checks performed.
    pub fn count(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Verifier for RecordingVerifier {
    fn verify(&self, value: &Value) -> bool {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value.clone());
        self.verdict
    }
}
