//! Manager lookup, replacement and back-reference behaviour.

mod common;

use common::{Foo, Test, init_test_logging};
use logica::{
    Args, Config, LogicError, LogicModule, Manager, ModuleConfig, args,
    testing::{CallResultExt, OutcomeExt},
};
use serde_json::json;
use std::thread;

#[test]
fn test_lookup_rejects_missing_name() {
    init_test_logging();
    let manager = Manager::default();
    manager.load::<Test>("Test").unwrap();

    assert!(matches!(manager.lookup(""), Err(LogicError::NameRequired)));
    assert!(matches!(
        manager.lookup(None::<&str>),
        Err(LogicError::NameRequired)
    ));
}

#[test]
fn test_lookup_unregistered_names_the_module() {
    let manager = Manager::default();
    let err = manager.lookup("Unregistered").unwrap_err();

    assert!(matches!(err, LogicError::NotRegistered(ref name) if name == "Unregistered"));
    assert!(err.to_string().contains("Unregistered"));
}

#[test]
fn test_repeated_lookup_returns_same_instance() {
    let manager = common::manager();

    let first = manager.lookup_as::<Test>("Test").unwrap();
    let second = manager.lookup_as::<Test>("Test").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[test]
fn test_reload_replaces_module() {
    let manager = common::manager();
    assert!(manager.lookup("Test").unwrap().has_action("simple"));

    manager.load::<Foo>("Test").unwrap();

    let replaced = manager.lookup("Test").unwrap();
    assert!(!replaced.has_action("simple"));
    assert!(replaced.downcast::<Foo>().is_some());
    assert_eq!(manager.len(), 2);
}

#[test]
fn test_missing_config_fragment_is_empty() {
    let manager = common::manager();

    let foo = manager.lookup("Foo").unwrap();
    assert!(foo.config().is_empty());

    let test = manager.lookup_as::<Test>("Test").unwrap();
    assert_eq!(test.config_value("foo"), Some(&json!(23)));
    assert_eq!(test.config_value("bar"), None);
}

#[test]
fn test_module_without_fragment_defaults_multiplier() {
    let manager = Manager::default();
    manager.load::<Test>("Test").unwrap();

    let outcome = manager
        .lookup("Test")
        .unwrap()
        .call("simple", args! { "foo" => 2 })
        .expect_outcome();
    assert_eq!(outcome.expect_value(), json!(2));
}

#[test]
fn test_registries_are_independent() {
    let first = Manager::new(Config::new().with_module("Test", ModuleConfig::new().with("foo", 23)));
    let second = Manager::new(Config::new().with_module("Test", ModuleConfig::new().with("foo", 10)));
    first.load::<Test>("Test").unwrap();
    second.load::<Test>("Test").unwrap();

    let a = first
        .lookup("Test")
        .unwrap()
        .call("simple", args! { "foo" => 2 })
        .expect_outcome()
        .expect_value();
    let b = second
        .lookup("Test")
        .unwrap()
        .call("simple", args! { "foo" => 2 })
        .expect_outcome()
        .expect_value();

    assert_eq!(a, json!(46));
    assert_eq!(b, json!(20));
    assert!(!second.is_loaded("Foo"));
}

#[test]
fn test_sibling_must_be_loaded_in_same_registry() {
    let manager = Manager::default();
    manager.load::<Test>("Test").unwrap();

    let err = manager
        .lookup("Test")
        .unwrap()
        .call("callwide", Args::new())
        .expect_defect();
    assert!(matches!(err, LogicError::NotRegistered(ref name) if name == "Foo"));

    manager.load::<Foo>("Foo").unwrap();
    let outcome = manager
        .lookup("Test")
        .unwrap()
        .call("callwide", Args::new())
        .expect_outcome();
    assert_eq!(outcome.expect_value(), json!(42));
}

#[test]
fn test_dropped_registry_detaches_modules() {
    let manager = common::manager();
    let test = manager.lookup_as::<Test>("Test").unwrap();
    assert!(test.base().is_attached());

    drop(manager);

    assert!(!test.base().is_attached());
    let err = test.call("callwide", &Args::new()).expect_defect();
    assert!(matches!(err, LogicError::Detached));
}

#[test]
fn test_names_are_sorted() {
    let manager = common::manager();
    assert_eq!(manager.names(), vec!["Foo".to_string(), "Test".to_string()]);
    assert!(manager.is_loaded("Foo"));
    assert!(!manager.is_empty());

    let test = manager.lookup("Test").unwrap();
    assert_eq!(test.name(), "Test");
    assert_eq!(
        test.actions(),
        vec!["callwide", "countdown", "dies", "forward", "mult", "needings", "simple"]
    );
}

#[test]
fn test_shared_across_threads() {
    let manager = common::manager();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let manager = manager.clone();
            thread::spawn(move || {
                manager
                    .lookup("Test")
                    .unwrap()
                    .call("simple", args! { "foo" => i })
                    .expect_outcome()
                    .expect_value()
            })
        })
        .collect();

    let mut results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort_by_key(|v| v.as_i64());
    assert_eq!(results, vec![json!(0), json!(23), json!(46), json!(69)]);
}
