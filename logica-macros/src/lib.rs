//! Procedural macros for Logica.
//!
//! - `#[derive(LogicModule)]` - implements `LogicModule` for a struct embedding a `ModuleBase`
//! - `#[actions]` - turns `#[action(...)]` methods of an impl block into registered actions

use proc_macro::TokenStream;

mod actions;
mod module;

/// Derive `LogicModule` for a struct with named fields.
///
/// The field marked `#[base]`, or else the field typed `ModuleBase`,
/// receives the base. Every other field is built with `Default`.
#[proc_macro_derive(LogicModule, attributes(base))]
pub fn derive_logic_module(input: TokenStream) -> TokenStream {
    module::derive_logic_module_impl(input)
}

/// Register the `#[action(...)]` methods of an inherent impl block.
///
/// ```rust,ignore
/// #[logica::actions]
/// impl Test {
///     #[action(needs(list, factor), verify(list = is_array, factor = is_numeric))]
///     fn mult(&self, cx: &Context<'_, Self>) -> Result<Vec<f64>, Fault> { ... }
/// }
/// ```
///
/// Each action method is replaced by a method of the same name and visibility
/// taking `Args` and returning `Result<Outcome, LogicError>`, and the type
/// gains an `ActionProvider` implementation listing every action. The
/// generated methods dispatch through `LogicModule::call`, so the type must
/// also implement `LogicModule`.
#[proc_macro_attribute]
pub fn actions(attr: TokenStream, item: TokenStream) -> TokenStream {
    actions::actions_impl(attr, item)
}
