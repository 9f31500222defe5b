//! Error types for Logica.
//!
//! Failures are split into two disjoint classes:
//!
//! - [`DomainError`] - an expected business failure raised deliberately by
//!   module code. The capture protocol turns it into a failed [`Outcome`].
//! - [`LogicError`] - a defect (bad call site, bad wiring). It always
//!   propagates to the caller and is never downgraded into an [`Outcome`].
//!
//! Handlers report either class through [`Fault`].
//!
//! [`Outcome`]: crate::Outcome

use std::{error::Error as StdError, fmt, sync::Arc};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Classification key used when a domain failure does not name one.
pub const DEFAULT_FAILURE_KEY: &str = "misc";

/// Defects: errors caused by malformed calls or broken wiring.
#[derive(Error, Debug)]
pub enum LogicError {
    /// One or more required arguments were absent.
    #[error("Missing {} argument(s) for {action} Logic Action.", .fields.join(", "))]
    MissingArguments {
        /// The action being invoked.
        action: String,
        /// Every missing field, sorted.
        fields: Vec<String>,
    },

    /// A verifier rejected an argument value.
    #[error("Argument '{field}' did not pass verification.")]
    VerificationFailed {
        /// The action being invoked.
        action: String,
        /// The rejected field.
        field: String,
    },

    /// An argument could not be read as the requested type.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument {
        /// The offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A module lookup was attempted without a name.
    #[error("module name required")]
    NameRequired,

    /// No module is registered under the name.
    #[error("module '{0}' is not registered")]
    NotRegistered(String),

    /// The module has no action with the given name.
    #[error("module '{module}' has no action '{action}'")]
    UnknownAction {
        /// The module that was called.
        module: String,
        /// The requested action.
        action: String,
    },

    /// A typed lookup found a module of another type.
    #[error("module '{module}' is not a {expected}")]
    TypeMismatch {
        /// The registered name.
        module: String,
        /// The requested type.
        expected: &'static str,
    },

    /// The module has no live registry to resolve siblings through.
    #[error("module is not attached to a registry")]
    Detached,

    /// Config could not be interpreted.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Any other defect raised by handler code.
    #[error(transparent)]
    Custom(BoxError),
}

impl From<BoxError> for LogicError {
    fn from(err: BoxError) -> Self {
        LogicError::Custom(err)
    }
}

/// An expected business failure carrying a classification key and a message.
///
/// The optional source keeps the underlying cause for inspection.
#[derive(Clone)]
pub struct DomainError {
    key: String,
    message: String,
    source: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl DomainError {
    /// Create a domain failure. An empty key becomes [`DEFAULT_FAILURE_KEY`].
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            key: if key.is_empty() {
                DEFAULT_FAILURE_KEY.to_owned()
            } else {
                key
            },
            message: message.into(),
            source: None,
        }
    }

    /// Create a domain failure with the default key.
    pub fn misc(message: impl Into<String>) -> Self {
        Self::new(DEFAULT_FAILURE_KEY, message)
    }

    /// Attach the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    /// The classification key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainError")
            .field("key", &self.key)
            .field("message", &self.message)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.key, self.message)
    }
}

impl StdError for DomainError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl PartialEq for DomainError {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.message == other.message
    }
}

impl From<&str> for DomainError {
    fn from(message: &str) -> Self {
        Self::misc(message)
    }
}

impl From<String> for DomainError {
    fn from(message: String) -> Self {
        Self::misc(message)
    }
}

/// The error channel of an action handler.
#[derive(Error, Debug)]
pub enum Fault {
    /// A sanctioned business failure; captured into a failed `Outcome`.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A defect; propagates out of `execute`.
    #[error(transparent)]
    Defect(#[from] LogicError),
}

impl Fault {
    /// Wrap any error as a defect.
    pub fn defect(err: impl Into<BoxError>) -> Self {
        Fault::Defect(LogicError::Custom(err.into()))
    }

    /// Whether this is a domain failure.
    pub fn is_domain(&self) -> bool {
        matches!(self, Fault::Domain(_))
    }
}
