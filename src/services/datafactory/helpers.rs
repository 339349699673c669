//! Expand/flatten between declared fields and Data Factory payloads

use super::models::ParameterSpecification;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Every declared parameter becomes a `String` parameter with a default
pub fn expand_parameters(input: &BTreeMap<String, String>) -> BTreeMap<String, ParameterSpecification> {
    input
        .iter()
        .map(|(name, value)| {
            (
                name.clone(),
                ParameterSpecification {
                    parameter_type: "String".to_string(),
                    default_value: Some(Value::String(value.clone())),
                },
            )
        })
        .collect()
}

/// Parameters with a string default value; others are skipped.
/// `None` when nothing is left.
pub fn flatten_parameters(
    input: Option<&BTreeMap<String, ParameterSpecification>>,
) -> Option<Map<String, Value>> {
    let input = input?;
    let mut output = Map::new();

    for (name, spec) in input {
        match &spec.default_value {
            Some(Value::String(value)) => {
                output.insert(name.clone(), Value::String(value.clone()));
            },
            _ => {
                tracing::debug!(
                    "Skipping parameter {:?} since its default value is not a string",
                    name
                );
            },
        }
    }

    if output.is_empty() {
        return None;
    }
    Some(output)
}

/// String annotations; others are skipped
pub fn flatten_annotations(input: Option<&Vec<Value>>) -> Option<Vec<Value>> {
    let input = input?;
    Some(input.iter().filter(|v| v.is_string()).cloned().collect())
}

/// Declared `schema_column` blocks to the dataset `structure` array
pub fn expand_structure(columns: &[&Map<String, Value>]) -> Value {
    Value::Array(
        columns
            .iter()
            .map(|column| {
                let mut out = Map::new();
                for key in ["name", "type", "description"] {
                    if let Some(Value::String(s)) = column.get(key) {
                        if !s.is_empty() {
                            out.insert(key.to_string(), Value::String(s.clone()));
                        }
                    }
                }
                Value::Object(out)
            })
            .collect(),
    )
}

/// Dataset `structure` back to `schema_column` blocks.
/// `None` when the structure is absent or an expression object.
pub fn flatten_structure_columns(input: Option<&Value>) -> Option<Vec<Value>> {
    let items = input?.as_array()?;

    Some(
        items
            .iter()
            .filter_map(|item| {
                let item = item.as_object()?;
                let mut column = Map::new();
                for key in ["name", "type", "description"] {
                    if let Some(Value::String(s)) = item.get(key) {
                        column.insert(key.to_string(), Value::String(s.clone()));
                    }
                }
                if column.contains_key("name") {
                    Some(Value::Object(column))
                } else {
                    None
                }
            })
            .collect(),
    )
}

/// Additional properties are declared as strings; other JSON values are
/// rendered as their JSON text
pub fn flatten_additional_properties(input: &Map<String, Value>) -> Option<Map<String, Value>> {
    if input.is_empty() {
        return None;
    }

    Some(
        input
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), Value::String(value))
            })
            .collect(),
    )
}
