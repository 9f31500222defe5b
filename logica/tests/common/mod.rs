#![allow(dead_code)]

use logica::{
    Action, ActionProvider, ActionSet, Args, Config, Context, Fault, LogicModule, Manager,
    ModuleBase, Value,
    verifiers::{is_array, is_numeric},
};
use std::sync::Once;

// ============================================================================
// Logging
// ============================================================================

static INIT_LOGGING: Once = Once::new();

/// Route `tracing` output to the test writer when `TEST_LOG` is set.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
                .init();
        }
    });
}

// ============================================================================
// Helpers
// ============================================================================

/// A number or numeric string as `f64`.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Whole numbers come back as JSON integers.
pub fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

// ============================================================================
// Test Modules
// ============================================================================

#[derive(Debug)]
pub struct Test {
    base: ModuleBase,
}

impl LogicModule for Test {
    fn from_base(base: ModuleBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ModuleBase {
        &self.base
    }
}

impl Test {
    fn multiplier(&self) -> i64 {
        self.config_value("foo")
            .and_then(Value::as_i64)
            .unwrap_or(1)
    }
}

impl ActionProvider for Test {
    fn register_actions(actions: &mut ActionSet<Self>) {
        actions
            .add(
                Action::new("simple", |cx: &Context<'_, Self>| {
                    let foo: i64 = cx.get("foo")?;
                    Ok(foo * cx.module().multiplier())
                })
                .need("foo"),
            )
            .add(
                Action::new("needings", |cx: &Context<'_, Self>| {
                    let foo: i64 = cx.get("foo")?;
                    let bar: i64 = cx.get("bar")?;
                    Ok(foo * bar)
                })
                .needs(["foo", "bar"]),
            )
            .add(
                Action::new("mult", |cx: &Context<'_, Self>| {
                    let factor = cx.arg("factor").and_then(numeric).unwrap_or(1.0);
                    let list: Vec<Value> = cx.get("list")?;
                    Ok(list
                        .iter()
                        .map(|item| numeric(item).map_or(Value::Null, |n| number(n * factor)))
                        .collect::<Vec<_>>())
                })
                .needs(["list", "factor"])
                .verify("list", is_array)
                .verify("factor", is_numeric),
            )
            .add(
                Action::new("dies", |cx: &Context<'_, Self>| {
                    let foo: String = cx.get("foo")?;
                    cx.module().fail::<()>("fookey", format!("The Foo was: {foo}"))
                })
                .need("foo"),
            )
            .add(Action::new("callwide", |cx: &Context<'_, Self>| {
                let outcome = cx.resolve("Foo")?.call("to_call", Args::new())?;
                match outcome.value().and_then(Value::as_i64) {
                    Some(n) => Ok(Value::from(n * 2)),
                    None => Ok(Value::Null),
                }
            }))
            .add(Action::new("forward", |cx: &Context<'_, Self>| {
                let target: String = cx.get("target")?;
                Ok(cx.resolve("Foo")?.call(&target, cx.args().clone())?)
            }))
            .add(
                Action::new("countdown", |cx: &Context<'_, Self>| {
                    let n: u64 = cx.get("n")?;
                    if n == 0 {
                        return Ok(Value::from(0));
                    }
                    let outcome = cx
                        .resolve("Foo")?
                        .call("countdown", Args::new().with("n", n - 1))?;
                    Ok(Value::from(outcome.value().and_then(Value::as_u64).unwrap_or(0) + 1))
                })
                .need("n"),
            );
    }
}

#[derive(Debug)]
pub struct Foo {
    base: ModuleBase,
}

impl LogicModule for Foo {
    fn from_base(base: ModuleBase) -> Self {
        Self { base }
    }

    fn base(&self) -> &ModuleBase {
        &self.base
    }
}

impl ActionProvider for Foo {
    fn register_actions(actions: &mut ActionSet<Self>) {
        actions
            .add(Action::new("to_call", |_: &Context<'_, Self>| Ok(21)))
            .add(Action::new("whoami", |cx: &Context<'_, Self>| {
                let me = cx.resolve(None::<&str>)?;
                let outcome = me.call("to_call", Args::new())?;
                Ok(serde_json::json!({ "name": me.name(), "value": outcome.value() }))
            }))
            .add(Action::new("explode", |cx: &Context<'_, Self>| {
                cx.module().fail::<()>("foo_failed", "Foo gave up")
            }))
            .add(Action::new("defect", |_: &Context<'_, Self>| -> Result<(), Fault> {
                Err(Fault::defect(std::io::Error::other("wiring broken")))
            }))
            .add(
                Action::new("countdown", |cx: &Context<'_, Self>| {
                    let n: u64 = cx.get("n")?;
                    if n == 0 {
                        return Ok(Value::from(0));
                    }
                    let outcome = cx
                        .resolve("Test")?
                        .call("countdown", Args::new().with("n", n - 1))?;
                    Ok(Value::from(outcome.value().and_then(Value::as_u64).unwrap_or(0) + 1))
                })
                .need("n"),
            );
    }
}

/// A manager with `Test` (config `{foo: 23}`) and `Foo` loaded.
pub fn manager() -> Manager {
    init_test_logging();
    let config = Config::from_json_str(r#"{"Test": {"foo": 23}}"#).expect("valid config");
    let manager = Manager::new(config);
    manager
        .load::<Test>("Test")
        .and_then(|m| m.load::<Foo>("Foo"))
        .expect("modules load");
    manager
}
