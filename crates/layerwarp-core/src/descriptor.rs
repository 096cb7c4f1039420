//! Action descriptors exchanged with the host
//!
//! A descriptor is a JSON object whose `_obj` field names the verb
//! (`get`, `set`, `make`, `select`, `delete`, `cut`, `move`, `transform`)
//! and whose remaining fields reference targets and parameters. Results come
//! back as JSON objects too.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{HostError, Result};

/// An immutable action descriptor ready to be executed by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor(Value);

impl Descriptor {
    /// Wrap a JSON value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The `_obj` verb, or an empty string if absent
    pub fn verb(&self) -> &str {
        self.0.get("_obj").and_then(Value::as_str).unwrap_or("")
    }

    /// Look up a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `_target` reference, if any
    pub fn target(&self) -> Option<&Value> {
        self.0.get("_target")
    }

    /// Whether the `_target` reference is the document selection channel
    pub fn targets_selection(&self) -> bool {
        self.target()
            .and_then(Value::as_array)
            .and_then(|refs| refs.first())
            .and_then(|first| first.get("_property"))
            .and_then(Value::as_str)
            == Some("selection")
    }

    /// Layer ids referenced anywhere in the `_target` reference
    pub fn referenced_layer_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        if let Some(refs) = self.target().and_then(Value::as_array) {
            for reference in refs {
                if reference.get("_ref").and_then(Value::as_str) == Some("layer") {
                    if let Some(id) = reference.get("_id").and_then(Value::as_i64) {
                        ids.push(id);
                    }
                }
            }
        }
        ids
    }

    /// Borrow the underlying JSON
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume into the underlying JSON
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Descriptor {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The host's answer to one descriptor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DescriptorResult(Map<String, Value>);

impl DescriptorResult {
    /// An empty result
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// Build a result from a JSON value; non-objects become empty results
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::empty(),
        }
    }

    /// Add a field, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Whether the result carries the given property
    pub fn has_property(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Read a boolean field
    pub fn bool_field(&self, verb: &str, key: &str) -> Result<bool> {
        self.0
            .get(key)
            .and_then(Value::as_bool)
            .ok_or_else(|| HostError::missing_field(verb, key))
    }

    /// Read an integer field
    pub fn i64_field(&self, verb: &str, key: &str) -> Result<i64> {
        self.0
            .get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| HostError::missing_field(verb, key))
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
