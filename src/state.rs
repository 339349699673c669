//! Declared resource state
//!
//! [`ResourceData`] is the flat field map a handler reads its desired
//! configuration from and writes observed state back into, together with
//! the persistent resource ID.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Declared state of one resource instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    /// Persistent key; empty until the resource has been created or imported
    id: String,
    values: Map<String, Value>,
    is_new: bool,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from a field map, e.g. a parsed configuration document
    pub fn from_values(values: Map<String, Value>) -> Self {
        let mut data = Self {
            values,
            ..Self::default()
        };
        if let Some(Value::String(id)) = data.values.remove("id") {
            data.id = id;
        }
        data
    }

    /// Load a state document from a JSON or YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let value: Value = if is_yaml {
            serde_yaml::from_str(&content).context("Failed to parse YAML state")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON state")?
        };

        match value {
            Value::Object(map) => Ok(Self::from_values(map)),
            Value::Null => Ok(Self::new()),
            _ => Err(anyhow::anyhow!("State document must be an object")),
        }
    }

    /// Render the state as a JSON object with `id` alongside the fields
    pub fn to_json(&self) -> Value {
        let mut map = self.values.clone();
        if !self.id.is_empty() {
            map.insert("id".to_string(), Value::String(self.id.clone()));
        }
        Value::Object(map)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Whether this state is going through its first create
    pub fn is_new_resource(&self) -> bool {
        self.is_new
    }

    pub fn mark_new_resource(&mut self, is_new: bool) {
        self.is_new = is_new;
    }

    /// Whether the resource is gone: no ID and no fields
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.values.is_empty()
    }

    /// Remove the ID and every field, signalling that the resource is gone
    pub fn clear(&mut self) {
        self.id.clear();
        self.values.clear();
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    /// Get a field only if it is set to a non-zero value
    /// (non-empty string, map or list)
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !is_zero(v))
    }

    /// String field, empty when unset
    pub fn get_str(&self, key: &str) -> &str {
        self.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    /// String field, `None` when unset or empty
    pub fn get_ok_str(&self, key: &str) -> Option<&str> {
        self.get_ok(key).and_then(|v| v.as_str())
    }

    /// Map-of-string field; non-string entries are skipped
    pub fn get_string_map(&self, key: &str) -> Option<BTreeMap<String, String>> {
        let map = self.get_ok(key)?.as_object()?;
        Some(
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect(),
        )
    }

    /// List-of-string field; non-string entries are skipped
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        let list = self.get_ok(key)?.as_array()?;
        Some(
            list.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        )
    }

    /// Nested block list; each entry is an object
    pub fn get_blocks(&self, key: &str) -> Option<Vec<&Map<String, Value>>> {
        let list = self.get_ok(key)?.as_array()?;
        Some(list.iter().filter_map(|v| v.as_object()).collect())
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// All fields with a non-null value
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, _)| k.as_str())
    }
}

/// Zero values in the sense of "not configured"
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(_) => false,
    }
}
