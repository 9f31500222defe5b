//! # logica-std
//!
//! Standard implementations for the Logica logic-module framework.
//!
//! This crate provides:
//! - **Verifiers**: argument predicates and combinators for [`Action::verify`]
//! - **Testing**: outcome assertions and a recording verifier
//!
//! [`Action::verify`]: logica_core::Action::verify

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use logica_core;

// Modules
pub mod testing;
pub mod verifiers;
