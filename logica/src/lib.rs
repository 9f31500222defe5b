//! # logica - Named Logic Modules with Validated Actions
//!
//! `logica` keeps business logic apart from request/response layers. Logic
//! lives in *modules*; each module type declares named *actions* guarded by
//! required-field sets and per-field verifiers. Every call returns a uniform
//! [`Outcome`], while malformed calls surface as [`LogicError`] defects.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use logica::prelude::*;
//! use logica::verifiers::{is_array, is_numeric};
//!
//! #[derive(LogicModule)]
//! struct Test {
//!     base: ModuleBase,
//! }
//!
//! #[logica::actions]
//! impl Test {
//!     #[action(needs(foo))]
//!     fn simple(&self, cx: &Context<'_, Self>) -> Result<i64, Fault> {
//!         Ok(cx.get::<i64>("foo")? * 23)
//!     }
//!
//!     #[action(needs(list, factor), verify(list = is_array, factor = is_numeric))]
//!     fn mult(&self, cx: &Context<'_, Self>) -> Result<Vec<f64>, Fault> { ... }
//! }
//!
//! let manager = Manager::new(Config::from_json_str(r#"{"Test": {"foo": 23}}"#)?);
//! manager.load::<Test>("Test")?;
//!
//! let outcome = manager.lookup("Test")?.call("simple", args! { "foo" => 2 })?;
//! assert_eq!(outcome.value(), Some(&Value::from(46)));
//! ```
//!
//! ## Features
//!
//! - `macros` (default): `#[derive(LogicModule)]` and `#[actions]`
//! - `tracing`: structured events for loads, lookups and action execution

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use logica_core::{
    // Actions
    Action,
    ActionHandler,
    // Modules
    ActionProvider,
    ActionSet,
    // Values
    Args,
    // Errors
    BoxError,
    Config,
    Context,
    DEFAULT_FAILURE_KEY,
    DomainError,
    Fault,
    // Outcome
    IntoReply,
    LogicError,
    LogicModule,
    // Registry
    Manager,
    ManagerRef,
    Map,
    ModuleBase,
    ModuleConfig,
    ModuleHandle,
    Outcome,
    Reply,
    Value,
    Verifier,
    args,
    capture,
};

/// Standard argument verifiers.
pub mod verifiers {
    #![allow(clippy::wildcard_imports)]
    pub use logica_std::verifiers::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use logica_std::testing::*;
}

/// Prelude module - common imports for Logica.
///
/// # Usage
///
/// ```rust,ignore
/// use logica::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action, ActionProvider, ActionSet, Args, Config, Context, DomainError, Fault, IntoReply,
        LogicError, LogicModule, Manager, ModuleBase, ModuleConfig, ModuleHandle, Outcome, Value,
        args,
    };

    #[cfg(feature = "macros")]
    pub use crate::actions;
}

#[cfg(feature = "macros")]
pub use logica_macros::{LogicModule, actions};
