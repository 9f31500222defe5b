//! # Module registry
//!
//! The [`Manager`] owns every loaded module and resolves names to them.
//! It is a cheap, clonable handle to shared state; each `Manager::new`
//! creates an independent registry with its own module and config maps.
//!
//! Modules keep a [`ManagerRef`], a `Weak` handle, to resolve siblings.
//! Every successful [`lookup`](Manager::lookup) re-attaches it, so a module
//! obtained from the registry can always reach its siblings.
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = Manager::new(Config::from_value(json!({"Test": {"foo": 23}}))?);
//! manager.load::<Test>("Test")?.load::<Foo>("Foo")?;
//!
//! let outcome = manager.lookup("Test")?.call("simple", args! { "foo" => 2 })?;
//! assert_eq!(outcome.value(), Some(&json!(46)));
//! ```

use crate::{
    error::LogicError,
    module::{LogicModule, ModuleBase},
    outcome::Outcome,
    value::{Args, Config, ModuleConfig},
};
use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock, Weak},
};

/// A type-erased loaded module together with its action table.
trait LoadedModule: Send + Sync {
    fn base(&self) -> &ModuleBase;
    fn dispatch(&self, action: &str, args: &Args) -> Result<Outcome, LogicError>;
    fn action_names(&self) -> Vec<&str>;
    fn has_action(&self, action: &str) -> bool;
    fn type_name(&self) -> &'static str;
    fn instance(&self) -> Arc<dyn Any + Send + Sync>;
}

struct Loaded<M> {
    module: Arc<M>,
}

impl<M: LogicModule> LoadedModule for Loaded<M> {
    fn base(&self) -> &ModuleBase {
        self.module.base()
    }

    fn dispatch(&self, action: &str, args: &Args) -> Result<Outcome, LogicError> {
        self.module.call(action, args)
    }

    fn action_names(&self) -> Vec<&str> {
        self.module
            .base()
            .actions::<M>()
            .map(|actions| actions.names())
            .unwrap_or_default()
    }

    fn has_action(&self, action: &str) -> bool {
        self.module
            .base()
            .actions::<M>()
            .is_ok_and(|actions| actions.contains(action))
    }

    fn type_name(&self) -> &'static str {
        type_name::<M>()
    }

    fn instance(&self) -> Arc<dyn Any + Send + Sync> {
        self.module.clone()
    }
}

/// A loaded module as returned by [`Manager::lookup`].
#[derive(Clone)]
pub struct ModuleHandle {
    inner: Arc<dyn LoadedModule>,
}

impl ModuleHandle {
    /// Invoke an action by name.
    pub fn call(&self, action: &str, args: Args) -> Result<Outcome, LogicError> {
        self.inner.dispatch(action, &args)
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        self.inner.base().name()
    }

    /// The module's config fragment.
    pub fn config(&self) -> &ModuleConfig {
        self.inner.base().config()
    }

    /// The module's action names, sorted.
    pub fn actions(&self) -> Vec<&str> {
        self.inner.action_names()
    }

    /// Whether the module has an action.
    pub fn has_action(&self, action: &str) -> bool {
        self.inner.has_action(action)
    }

    /// The Rust type name of the module.
    pub fn type_name(&self) -> &'static str {
        self.inner.type_name()
    }

    /// The concrete module, if it is an `M`.
    pub fn downcast<M: LogicModule>(&self) -> Option<Arc<M>> {
        self.inner.instance().downcast::<M>().ok()
    }

    fn attach(&self, manager: &Manager) {
        self.inner.base().attach(manager);
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("name", &self.name())
            .field("type", &self.type_name())
            .field("actions", &self.actions())
            .finish()
    }
}

struct ManagerInner {
    config: Config,
    modules: RwLock<HashMap<String, ModuleHandle>>,
}

/// The registry of logic modules.
#[derive(Clone)]
pub struct Manager {
    inner: Arc<ManagerInner>,
}

impl Manager {
    /// Create a registry over `config`.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                config,
                modules: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The config mapping.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Construct an `M` with the config fragment for `name` and register it.
    ///
    /// Loading an already-registered name replaces the earlier module, even
    /// when the type differs (last write wins).
    pub fn load<M: LogicModule>(&self, name: &str) -> Result<&Self, LogicError> {
        if name.is_empty() {
            return Err(LogicError::NameRequired);
        }

        let base = ModuleBase::new(name, self.inner.config.fragment(name));
        let module = Arc::new(M::from_base(base));
        module.base().actions::<M>()?;

        let handle = ModuleHandle {
            inner: Arc::new(Loaded { module }),
        };
        handle.attach(self);

        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
        let previous = self
            .inner
            .modules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), handle);

        #[cfg(feature = "tracing")]
        {
            match &previous {
                Some(old) => tracing::warn!(
                    module = name,
                    old_type = old.type_name(),
                    new_type = type_name::<M>(),
                    "module re-loaded, replacing earlier instance"
                ),
                None => tracing::debug!(module = name, module_type = type_name::<M>(), "module loaded"),
            }
        }

        Ok(self)
    }

    /// Resolve `name` to its module.
    ///
    /// Accepts `&str` or `Option<&str>`; a missing or empty name is
    /// [`LogicError::NameRequired`].
    pub fn lookup<'n>(&self, name: impl Into<Option<&'n str>>) -> Result<ModuleHandle, LogicError> {
        let name = match name.into() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(LogicError::NameRequired),
        };

        let handle = self
            .inner
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();

        match handle {
            Some(handle) => {
                handle.attach(self);
                Ok(handle)
            }
            None => {
                #[cfg(feature = "tracing")]
                {
                    tracing::debug!(module = name, "lookup of unregistered module");
                }
                Err(LogicError::NotRegistered(name.to_owned()))
            }
        }
    }

    /// Resolve `name` to a module of type `M`.
    pub fn lookup_as<M: LogicModule>(&self, name: &str) -> Result<Arc<M>, LogicError> {
        self.lookup(name)?
            .downcast::<M>()
            .ok_or_else(|| LogicError::TypeMismatch {
                module: name.to_owned(),
                expected: type_name::<M>(),
            })
    }

    /// Whether a module is registered under `name`.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.inner
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .inner
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.inner
            .modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no module is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn downgrade(&self) -> ManagerRef {
        ManagerRef(Arc::downgrade(&self.inner))
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("modules", &self.names())
            .finish_non_exhaustive()
    }
}

/// A non-owning handle to a [`Manager`].
#[derive(Clone, Default)]
pub struct ManagerRef(Weak<ManagerInner>);

impl ManagerRef {
    /// A handle that resolves to nothing.
    pub fn detached() -> Self {
        Self(Weak::new())
    }

    /// The manager, if it is still alive.
    pub fn upgrade(&self) -> Option<Manager> {
        self.0.upgrade().map(|inner| Manager { inner })
    }
}

impl fmt::Debug for ManagerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ManagerRef")
            .field(&(self.0.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionSet, Context};
    use crate::module::ActionProvider;
    use serde_json::json;

    struct Alpha {
        base: ModuleBase,
    }

    impl LogicModule for Alpha {
        fn from_base(base: ModuleBase) -> Self {
            Self { base }
        }

        fn base(&self) -> &ModuleBase {
            &self.base
        }
    }

    impl ActionProvider for Alpha {
        fn register_actions(actions: &mut ActionSet<Self>) {
            actions.add(Action::new("kind", |_: &Context<'_, Self>| Ok("alpha")));
        }
    }

    struct Beta {
        base: ModuleBase,
    }

    impl LogicModule for Beta {
        fn from_base(base: ModuleBase) -> Self {
            Self { base }
        }

        fn base(&self) -> &ModuleBase {
            &self.base
        }
    }

    impl ActionProvider for Beta {
        fn register_actions(actions: &mut ActionSet<Self>) {
            actions.add(Action::new("kind", |_: &Context<'_, Self>| Ok("beta")));
        }
    }

    #[test]
    fn test_lookup_requires_name() {
        let manager = Manager::default();
        assert!(matches!(manager.lookup(""), Err(LogicError::NameRequired)));
        assert!(matches!(manager.lookup(None::<&str>), Err(LogicError::NameRequired)));
        assert!(matches!(
            manager.load::<Alpha>(""),
            Err(LogicError::NameRequired)
        ));
    }

    #[test]
    fn test_lookup_unregistered() {
        let manager = Manager::default();
        let err = manager.lookup("Unregistered").unwrap_err();
        assert!(matches!(err, LogicError::NotRegistered(ref n) if n == "Unregistered"));
    }

    #[test]
    fn test_load_then_lookup_returns_instance() {
        let manager = Manager::default();
        manager.load::<Alpha>("A").unwrap();
        let handle = manager.lookup("A").unwrap();
        assert!(handle.downcast::<Alpha>().is_some());
        assert!(handle.downcast::<Beta>().is_none());
        assert!(manager.lookup_as::<Alpha>("A").is_ok());
        assert!(matches!(
            manager.lookup_as::<Beta>("A"),
            Err(LogicError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_reload_last_write_wins() {
        let manager = Manager::default();
        manager.load::<Alpha>("X").unwrap().load::<Beta>("X").unwrap();
        assert_eq!(manager.len(), 1);
        let outcome = manager.lookup("X").unwrap().call("kind", Args::new()).unwrap();
        assert_eq!(outcome.value(), Some(&json!("beta")));
    }

    #[test]
    fn test_config_fragment_handed_to_module() {
        let config = Config::from_value(json!({"A": {"foo": 23}})).unwrap();
        let manager = Manager::new(config);
        manager.load::<Alpha>("A").unwrap().load::<Beta>("B").unwrap();
        assert_eq!(manager.lookup("A").unwrap().config().get("foo"), Some(&json!(23)));
        assert!(manager.lookup("B").unwrap().config().is_empty());
        assert_eq!(manager.names(), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_registries_are_independent() {
        let one = Manager::default();
        let two = Manager::default();
        one.load::<Alpha>("A").unwrap();
        assert!(one.is_loaded("A"));
        assert!(!two.is_loaded("A"));
        assert!(two.is_empty());
    }

    #[test]
    fn test_back_reference_is_weak() {
        let manager = Manager::default();
        manager.load::<Alpha>("A").unwrap();
        let alpha = manager.lookup_as::<Alpha>("A").unwrap();
        assert!(alpha.base().is_attached());

        drop(manager);
        assert!(!alpha.base().is_attached());
        assert!(matches!(alpha.lookup("A"), Err(LogicError::Detached)));
    }

    #[test]
    fn test_lookup_reattaches_registry() {
        let first = Manager::default();
        first.load::<Alpha>("A").unwrap();
        let handle = first.lookup("A").unwrap();
        let alpha = handle.downcast::<Alpha>().unwrap();

        let second = Manager::default();
        alpha.base().attach(&second);
        assert!(matches!(alpha.lookup("A"), Err(LogicError::NotRegistered(_))));

        first.lookup("A").unwrap();
        assert!(alpha.lookup("A").is_ok());
    }
}
