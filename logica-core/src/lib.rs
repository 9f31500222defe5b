//! # logica-core
//!
//! Core types for the Logica logic-module framework.
//!
//! Logica isolates business-logic methods behind a uniform calling
//! convention: callers get an [`Outcome`] back instead of raw errors, and
//! arguments are checked declaratively before any logic runs.
//!
//! # Components
//!
//! ## [`Outcome`] and [`capture`]
//!
//! The tagged success/failure wrapper. `capture` runs a handler and turns
//! its value or [`DomainError`] into an `Outcome`, passing nested outcomes
//! through untouched and letting defects escape.
//!
//! ## [`Action`]
//!
//! A named handler guarded by a required-field set and per-field
//! [`Verifier`]s. Handlers get an explicit [`Context`]: the owning module,
//! the [`Args`] and a resolver for sibling modules.
//!
//! ## [`Manager`]
//!
//! The registry: loads module types under names with their [`ModuleConfig`]
//! fragment and resolves names to [`ModuleHandle`]s.
//!
//! ## [`LogicModule`]
//!
//! The contract of a module type: it embeds a [`ModuleBase`] (config and a
//! non-owning registry reference) and registers its actions through
//! [`ActionProvider`].
//!
//! # Error Types
//!
//! - [`DomainError`] - expected business failures, captured into an `Outcome`
//! - [`LogicError`] - defects, always propagated
//! - [`Fault`] - the handler error channel carrying either

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod action;
mod error;
mod manager;
mod module;
mod outcome;
mod value;

// Re-exports
pub use action::{Action, ActionHandler, ActionSet, Context, Verifier};
pub use error::{BoxError, DEFAULT_FAILURE_KEY, DomainError, Fault, LogicError};
pub use manager::{Manager, ManagerRef, ModuleHandle};
pub use module::{ActionProvider, LogicModule, ModuleBase};
pub use outcome::{IntoReply, Outcome, Reply, capture};
pub use value::{Args, Config, Map, ModuleConfig, Value};

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}

/// Build an [`Args`] set from `name => value` pairs.
///
/// Values go through `serde_json::json!`, so anything serializable works.
///
/// ```rust,ignore
/// let args = args! { "list" => [1, 2, 3], "factor" => 2 };
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Args::new()$(.with($name, $crate::__private::serde_json::json!($value)))+
    };
}
