//! # Actions
//!
//! An [`Action`] gates a handler behind declarative argument checks:
//!
//! 1. every field in `needs` must be present (all missing fields are reported
//!    together);
//! 2. every verifier whose field is present must accept the value.
//!
//! Only then does the handler run, through [`capture`]. Both checks fail as
//! defects ([`LogicError`]), never as a failed [`Outcome`].
//!
//! Handlers receive a [`Context`] carrying the owning module, the arguments
//! and a resolver for sibling modules.

use crate::{
    error::{Fault, LogicError},
    manager::ModuleHandle,
    module::LogicModule,
    outcome::{IntoReply, Outcome, Reply, capture},
    value::{Args, Value},
};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A predicate over a single argument value.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot verify argument values",
    label = "missing `Verifier` implementation",
    note = "Verifiers are `Fn(&Value) -> bool` closures or functions."
)]
pub trait Verifier: Send + Sync + 'static {
    /// Whether `value` is acceptable.
    fn verify(&self, value: &Value) -> bool;
}

impl<F> Verifier for F
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    fn verify(&self, value: &Value) -> bool {
        (self)(value)
    }
}

/// The body of an action.
///
/// Closures of the shape `Fn(&Context<'_, M>) -> Result<Out, Fault>` implement
/// this automatically; implement it directly for stateful handler structs.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle actions on `{M}`",
    label = "missing `ActionHandler<{M}>` implementation",
    note = "Handlers take `&Context<'_, {M}>` and return `Result<impl IntoReply, Fault>`."
)]
pub trait ActionHandler<M>: Send + Sync + 'static {
    /// What the handler returns on success.
    type Output: IntoReply;

    /// Run the handler.
    fn handle(&self, cx: &Context<'_, M>) -> Result<Self::Output, Fault>;
}

impl<M, F, Out> ActionHandler<M> for F
where
    F: Fn(&Context<'_, M>) -> Result<Out, Fault> + Send + Sync + 'static,
    Out: IntoReply,
{
    type Output = Out;

    fn handle(&self, cx: &Context<'_, M>) -> Result<Self::Output, Fault> {
        (self)(cx)
    }
}

type BoxHandler<M> = Box<dyn Fn(&Context<'_, M>) -> Result<Reply, Fault> + Send + Sync>;

/// The explicit call context handed to every handler.
pub struct Context<'a, M> {
    module: &'a M,
    args: &'a Args,
    action: &'a str,
}

impl<'a, M> Context<'a, M> {
    /// Context for an anonymous invocation.
    pub fn new(module: &'a M, args: &'a Args) -> Self {
        Self {
            module,
            args,
            action: "",
        }
    }

    fn for_action(module: &'a M, args: &'a Args, action: &'a str) -> Self {
        Self {
            module,
            args,
            action,
        }
    }

    /// The owning module instance.
    pub fn module(&self) -> &'a M {
        self.module
    }

    /// The full argument set.
    pub fn args(&self) -> &'a Args {
        self.args
    }

    /// A single argument.
    pub fn arg(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name)
    }

    /// A single argument deserialized into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, Fault> {
        Ok(self.args.get_as(name)?)
    }

    /// The name of the running action.
    pub fn action(&self) -> &'a str {
        self.action
    }
}

impl<M: LogicModule> Context<'_, M> {
    /// Resolve a sibling module through the owning module's registry.
    ///
    /// `None` (or `""`) resolves the owning module itself, as registered.
    /// Use [`module`](Self::module) for direct access to the instance.
    pub fn resolve<'n>(&self, name: impl Into<Option<&'n str>>) -> Result<ModuleHandle, LogicError> {
        self.module.base().lookup(name)
    }
}

/// A named, validated operation on a logic module type.
pub struct Action<M> {
    name: String,
    needs: BTreeSet<String>,
    verifiers: BTreeMap<String, Box<dyn Verifier>>,
    handler: BoxHandler<M>,
}

impl<M: 'static> Action<M> {
    /// Create an action from a closure.
    pub fn new<F, Out>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Context<'_, M>) -> Result<Out, Fault> + Send + Sync + 'static,
        Out: IntoReply,
    {
        Self::from_handler(name, handler)
    }

    /// Create an action from any [`ActionHandler`].
    pub fn from_handler<H: ActionHandler<M>>(name: impl Into<String>, handler: H) -> Self {
        Self {
            name: name.into(),
            needs: BTreeSet::new(),
            verifiers: BTreeMap::new(),
            handler: Box::new(move |cx: &Context<'_, M>| {
                handler.handle(cx).map(IntoReply::into_reply)
            }),
        }
    }

    /// Require a set of fields.
    pub fn needs<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.needs.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Require a single field.
    pub fn need(mut self, field: impl Into<String>) -> Self {
        self.needs.insert(field.into());
        self
    }

    /// Check `field` with a predicate whenever it is present.
    pub fn verify<F>(self, field: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.verify_with(field, predicate)
    }

    /// Check `field` with any [`Verifier`] whenever it is present.
    pub fn verify_with(mut self, field: impl Into<String>, verifier: impl Verifier) -> Self {
        self.verifiers.insert(field.into(), Box::new(verifier));
        self
    }
}

impl<M> Action<M> {
    /// The action name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required field names, sorted.
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.needs.iter().map(String::as_str)
    }

    /// Fields that carry a verifier, sorted.
    pub fn verified(&self) -> impl Iterator<Item = &str> {
        self.verifiers.keys().map(String::as_str)
    }

    /// Check `args` against the required set and the verifiers.
    pub fn verify_arguments(&self, args: &Args) -> Result<(), LogicError> {
        let missing: Vec<String> = self
            .needs
            .iter()
            .filter(|field| !args.contains(field))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(LogicError::MissingArguments {
                action: self.name.clone(),
                fields: missing,
            });
        }

        for (field, verifier) in &self.verifiers {
            if let Some(value) = args.get(field) {
                if !verifier.verify(value) {
                    return Err(LogicError::VerificationFailed {
                        action: self.name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Verify `args`, then run the handler through [`capture`].
    pub fn execute(&self, module: &M, args: &Args) -> Result<Outcome, LogicError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("logic_action", action = %self.name).entered();

        if let Err(defect) = self.verify_arguments(args) {
            #[cfg(feature = "tracing")]
            {
                tracing::warn!(error = %defect, "argument check failed");
            }
            return Err(defect);
        }

        let cx = Context::for_action(module, args, &self.name);
        capture(|cx| (self.handler)(cx), &cx)
    }
}

impl<M> std::fmt::Debug for Action<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("needs", &self.needs)
            .field("verifiers", &self.verifiers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// The action table of a module type.
pub struct ActionSet<M> {
    actions: HashMap<String, Action<M>>,
}

impl<M> ActionSet<M> {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Add an action. A duplicate name replaces the earlier entry.
    pub fn add(&mut self, action: Action<M>) -> &mut Self {
        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let previous = self.actions.insert(action.name.clone(), action);
        #[cfg(feature = "tracing")]
        {
            if let Some(previous) = previous {
                tracing::warn!(action = %previous.name, "action re-registered, replacing earlier entry");
            }
        }
        self
    }

    /// Look up an action.
    pub fn get(&self, name: &str) -> Option<&Action<M>> {
        self.actions.get(name)
    }

    /// Whether an action exists.
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Action names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Verify and run the action `name` on `module`.
    pub fn dispatch(
        &self,
        module: &M,
        module_name: &str,
        name: &str,
        args: &Args,
    ) -> Result<Outcome, LogicError> {
        match self.actions.get(name) {
            Some(action) => action.execute(module, args),
            None => Err(LogicError::UnknownAction {
                module: module_name.to_owned(),
                action: name.to_owned(),
            }),
        }
    }
}

impl<M> Default for ActionSet<M> {
    fn default() -> Self {
        Self::new()
    }
}
