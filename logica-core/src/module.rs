//! # Logic module contract
//!
//! A logic module is an application type that holds related actions and
//! its own config fragment. It embeds a [`ModuleBase`] and implements:
//!
//! - [`ActionProvider`] - explicit registration of the type's actions
//! - [`LogicModule`] - construction from a base, and access to it
//!
//! Both can be generated with `#[derive(LogicModule)]` and `#[actions]`
//! when the `macros` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Greeter {
//!     base: ModuleBase,
//! }
//!
//! impl LogicModule for Greeter {
//!     fn from_base(base: ModuleBase) -> Self {
//!         Self { base }
//!     }
//!
//!     fn base(&self) -> &ModuleBase {
//!         &self.base
//!     }
//! }
//!
//! impl ActionProvider for Greeter {
//!     fn register_actions(actions: &mut ActionSet<Self>) {
//!         actions.add(Action::new("greet", |cx: &Context<'_, Self>| {
//!             let name: String = cx.get("name")?;
//!             Ok(format!("hello {name}"))
//!         }).need("name"));
//!     }
//! }
//! ```

use crate::{
    action::ActionSet,
    error::{DomainError, Fault, LogicError},
    manager::{Manager, ManagerRef, ModuleHandle},
    outcome::Outcome,
    value::{Args, ModuleConfig, Value},
};
use std::{
    any::{Any, type_name},
    sync::{OnceLock, PoisonError, RwLock},
};

/// State shared by every logic module: name, config, registry handle and
/// the module type's action table.
///
/// The registry handle is non-owning. The registry owns its modules, never
/// the other way round.
pub struct ModuleBase {
    name: String,
    config: ModuleConfig,
    registry: RwLock<ManagerRef>,
    actions: OnceLock<Box<dyn Any + Send + Sync>>,
}

impl ModuleBase {
    /// A base not yet attached to any registry.
    pub fn new(name: impl Into<String>, config: ModuleConfig) -> Self {
        Self {
            name: name.into(),
            config,
            registry: RwLock::new(ManagerRef::detached()),
            actions: OnceLock::new(),
        }
    }

    /// The name the module was loaded under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The config fragment.
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    /// Point this module at `manager`. Safe to repeat.
    pub fn attach(&self, manager: &Manager) {
        *self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner) = manager.downgrade();
    }

    /// Whether a live registry is attached.
    pub fn is_attached(&self) -> bool {
        self.registry().is_ok()
    }

    /// The owning registry.
    pub fn registry(&self) -> Result<Manager, LogicError> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .upgrade()
            .ok_or(LogicError::Detached)
    }

    /// Look up a sibling module by name.
    ///
    /// Without a name (`None` or `""`) this resolves the module's own
    /// registration.
    pub fn lookup<'n>(&self, name: impl Into<Option<&'n str>>) -> Result<ModuleHandle, LogicError> {
        let name = match name.into() {
            Some(name) if !name.is_empty() => name,
            _ => self.name.as_str(),
        };
        self.registry()?.lookup(name)
    }

    /// The action table of `M`, built on first use and kept for the life of
    /// the base.
    pub fn actions<M: ActionProvider + 'static>(&self) -> Result<&ActionSet<M>, LogicError> {
        self.actions
            .get_or_init(|| {
                let mut actions = ActionSet::<M>::new();
                M::register_actions(&mut actions);
                Box::new(actions) as Box<dyn Any + Send + Sync>
            })
            .downcast_ref::<ActionSet<M>>()
            .ok_or_else(|| LogicError::TypeMismatch {
                module: self.name.clone(),
                expected: type_name::<M>(),
            })
    }
}

impl std::fmt::Debug for ModuleBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleBase")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Registration of a module type's actions.
pub trait ActionProvider: Sized {
    /// Append this type's actions to `actions`.
    fn register_actions(actions: &mut ActionSet<Self>);
}

/// The contract every logic module type honors.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a logic module",
    label = "missing `LogicModule` implementation",
    note = "Embed a `ModuleBase` and implement `LogicModule`, or use `#[derive(LogicModule)]`."
)]
pub trait LogicModule: ActionProvider + Send + Sync + 'static {
    /// Construct the module around its base.
    fn from_base(base: ModuleBase) -> Self;

    /// The embedded base.
    fn base(&self) -> &ModuleBase;

    /// The config fragment.
    fn config(&self) -> &ModuleConfig {
        self.base().config()
    }

    /// A single config entry, `None` when absent.
    fn config_value(&self, key: &str) -> Option<&Value> {
        self.base().config().get(key)
    }

    /// Raise a domain failure.
    ///
    /// ```rust,ignore
    /// return self.fail("fookey", format!("The Foo was: {foo}"));
    /// ```
    fn fail<T>(&self, key: impl Into<String>, message: impl Into<String>) -> Result<T, Fault> {
        Err(Fault::Domain(DomainError::new(key, message)))
    }

    /// The owning registry.
    fn registry(&self) -> Result<Manager, LogicError> {
        self.base().registry()
    }

    /// Look up a sibling module by name, or this module's own registration
    /// when no name is given.
    fn lookup<'n>(&self, name: impl Into<Option<&'n str>>) -> Result<ModuleHandle, LogicError> {
        self.base().lookup(name)
    }

    /// Invoke an action by name on this instance.
    fn call(&self, action: &str, args: &Args) -> Result<Outcome, LogicError> {
        self.base()
            .actions::<Self>()?
            .dispatch(self, self.base().name(), action, args)
    }
}
