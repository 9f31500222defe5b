//! Dynamic values: call arguments and module configuration.

use crate::error::LogicError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;

pub use serde_json::{Map, Value};

/// The named-argument set of a single action call.
///
/// Offers both a lookup view ([`get`](Args::get)) and an iteration view
/// ([`iter`](Args::iter)) over the same pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(Map<String, Value>);

impl Args {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Interpret a JSON object as an argument set.
    pub fn from_value(value: Value) -> Result<Self, LogicError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(LogicError::InvalidArgument {
                field: String::new(),
                reason: format!("expected an object of named arguments, got {other}"),
            }),
        }
    }

    /// Look up an argument.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Look up an argument that must be present.
    pub fn require(&self, name: &str) -> Result<&Value, LogicError> {
        self.0.get(name).ok_or_else(|| LogicError::InvalidArgument {
            field: name.to_owned(),
            reason: "argument is absent".to_owned(),
        })
    }

    /// Deserialize an argument into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, LogicError> {
        let value = self.require(name)?;
        T::deserialize(value).map_err(|e| LogicError::InvalidArgument {
            field: name.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Whether an argument is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Argument names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Name/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Args {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Args
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Args {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Args {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One module's configuration fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleConfig(Map<String, Value>);

impl ModuleConfig {
    /// An empty fragment.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// A single entry; a missing key is `None`, never an error.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserialize a single entry, `None` when absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, LogicError> {
        self.0
            .get(key)
            .map(|v| {
                T::deserialize(v).map_err(|e| LogicError::InvalidConfig(format!("{key}: {e}")))
            })
            .transpose()
    }

    /// The whole fragment.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether the fragment holds no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ModuleConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Configuration for every module, keyed by module name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(HashMap<String, ModuleConfig>);

impl Config {
    /// An empty config.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insert of one module's fragment.
    pub fn with_module(mut self, name: impl Into<String>, fragment: impl Into<ModuleConfig>) -> Self {
        self.0.insert(name.into(), fragment.into());
        self
    }

    /// Interpret a JSON value of the shape `{ "Module": { ... }, ... }`.
    pub fn from_value(value: Value) -> Result<Self, LogicError> {
        serde_json::from_value(value).map_err(|e| LogicError::InvalidConfig(e.to_string()))
    }

    /// Parse a JSON document of the shape `{ "Module": { ... }, ... }`.
    pub fn from_json_str(json: &str) -> Result<Self, LogicError> {
        serde_json::from_str(json).map_err(|e| LogicError::InvalidConfig(e.to_string()))
    }

    /// The fragment for `name`, empty when absent.
    pub fn fragment(&self, name: &str) -> ModuleConfig {
        self.0.get(name).cloned().unwrap_or_default()
    }

    /// Whether a fragment exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}
