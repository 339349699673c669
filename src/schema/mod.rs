//! Resource descriptors
//!
//! A [`Schema`] declares the fields of a resource: their kind, whether
//! they are required, optional or computed, how they are validated and
//! which other fields they exclude. [`Schema::validate_config`] checks a
//! configuration against it before any API call is made.

pub mod validate;

use crate::error::ProviderError;
use crate::state::ResourceData;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Checks a configured string value, returning a problem description
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Shape of a field's value
#[derive(Clone)]
pub enum FieldKind {
    String,
    /// Map of string to string
    Map,
    /// Ordered list of strings
    List,
    /// Ordered list of nested records
    Block(Schema),
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Map => "map(string)",
            Self::List => "list(string)",
            Self::Block(_) => "list(object)",
        }
    }
}

/// Declaration of one field
#[derive(Clone)]
pub struct FieldSchema {
    pub kind: FieldKind,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing the value requires replacing the resource
    pub force_new: bool,
    pub validate: Option<Validator>,
    /// Deprecation message shown when the field is set
    pub deprecated: Option<&'static str>,
    /// Exactly one of these fields (plus this one) must be set
    pub exactly_one_of: Vec<&'static str>,
    pub conflicts_with: Vec<&'static str>,
    /// The API may return this value with a different case
    pub case_insensitive: bool,
    /// Normalises a configured string before it is stored in state
    pub state_func: Option<fn(&str) -> String>,
    pub description: &'static str,
}

impl FieldSchema {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            validate: None,
            deprecated: None,
            exactly_one_of: Vec::new(),
            conflicts_with: Vec::new(),
            case_insensitive: false,
            state_func: None,
            description: "",
        }
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn map() -> Self {
        Self::of(FieldKind::Map)
    }

    pub fn list() -> Self {
        Self::of(FieldKind::List)
    }

    pub fn block(schema: Schema) -> Self {
        Self::of(FieldKind::Block(schema))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn deprecated(mut self, message: &'static str) -> Self {
        self.deprecated = Some(message);
        self
    }

    pub fn exactly_one_of(mut self, keys: &[&'static str]) -> Self {
        self.exactly_one_of = keys.to_vec();
        self
    }

    pub fn conflicts_with(mut self, keys: &[&'static str]) -> Self {
        self.conflicts_with = keys.to_vec();
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn state_func(mut self, func: fn(&str) -> String) -> Self {
        self.state_func = Some(func);
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Only the read step may populate this field
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), json!(self.kind.type_name()));
        for (flag, set) in [
            ("required", self.required),
            ("optional", self.optional),
            ("computed", self.computed),
            ("force_new", self.force_new),
        ] {
            if set {
                out.insert(flag.into(), json!(true));
            }
        }
        if let Some(message) = self.deprecated {
            out.insert("deprecated".into(), json!(message));
        }
        if !self.exactly_one_of.is_empty() {
            out.insert("exactly_one_of".into(), json!(self.exactly_one_of));
        }
        if !self.conflicts_with.is_empty() {
            out.insert("conflicts_with".into(), json!(self.conflicts_with));
        }
        if !self.description.is_empty() {
            out.insert("description".into(), json!(self.description));
        }
        if let FieldKind::Block(nested) = &self.kind {
            out.insert("block".into(), nested.to_json());
        }
        Value::Object(out)
    }
}

/// Ordered set of field declarations
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(&'static str, FieldSchema)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field
    pub fn field(mut self, name: &'static str, field: FieldSchema) -> Self {
        self.fields.push((name, field));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, f)| f)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &FieldSchema)> {
        self.fields.iter().map(|(n, f)| (*n, f))
    }

    /// Fields whose change forces a new resource
    pub fn force_new_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|(_, f)| f.force_new).map(|(n, _)| *n)
    }

    /// Apply each string field's state function to `data`
    pub fn normalize(&self, data: &mut ResourceData) {
        for (name, field) in self.fields() {
            let Some(func) = field.state_func else {
                continue;
            };
            if let Some(normalized) = data.get_ok_str(name).map(func) {
                data.set(name, normalized);
            }
        }
    }

    /// Whether two values of `name` differ, honouring case-insensitivity
    pub fn values_differ(&self, name: &str, a: Option<&Value>, b: Option<&Value>) -> bool {
        let case_insensitive = self.get(name).is_some_and(|f| f.case_insensitive);
        match (a, b) {
            (Some(Value::String(a)), Some(Value::String(b))) if case_insensitive => {
                !a.eq_ignore_ascii_case(b)
            },
            (a, b) => a != b,
        }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, field)| (name.to_string(), field.to_json()))
                .collect(),
        )
    }

    /// Check a configuration before it is handed to create/update.
    /// Every problem is collected; none of them involve the API.
    pub fn validate_config(&self, data: &ResourceData) -> Result<(), ProviderError> {
        let mut problems = BTreeSet::new();

        for key in data.keys() {
            if self.get(key).is_none() {
                problems.insert(format!("{}: unsupported argument", key));
            }
        }

        for (name, field) in self.fields() {
            let value = data.get(name);
            let is_set = data.get_ok(name).is_some();

            if field.required && !is_set {
                problems.insert(format!("{}: required field is not set", name));
            }

            if let Some(value) = value {
                if field.is_computed_only() {
                    problems.insert(format!("{}: computed attribute cannot be set", name));
                }
                check_value(name, field, value, &mut problems);
            }

            if is_set {
                if let Some(message) = field.deprecated {
                    tracing::warn!("{}: {}", name, message);
                }
            }

            if !field.exactly_one_of.is_empty() {
                let mut group: Vec<&str> = field.exactly_one_of.clone();
                if !group.contains(&name) {
                    group.push(name);
                }
                group.sort_unstable();

                let set_count = group.iter().filter(|k| data.get_ok(k).is_some()).count();
                match set_count {
                    0 => {
                        problems.insert(format!(
                            "one of `{}` must be specified",
                            group.join(",")
                        ));
                    },
                    1 => {},
                    _ => {
                        problems.insert(format!(
                            "only one of `{}` can be specified",
                            group.join(",")
                        ));
                    },
                }
            }

            if is_set {
                for other in &field.conflicts_with {
                    if data.get_ok(other).is_some() {
                        problems.insert(format!(
                            "{}: conflicts with {}",
                            name, other
                        ));
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::InvalidConfig(problems.into_iter().collect()))
        }
    }
}

fn check_value(path: &str, field: &FieldSchema, value: &Value, problems: &mut BTreeSet<String>) {
    match (&field.kind, value) {
        (FieldKind::String, Value::String(s)) => {
            if let Some(validate) = &field.validate {
                if let Err(message) = validate(s) {
                    problems.insert(format!("{}: {}", path, message));
                }
            }
        },
        (FieldKind::Map, Value::Object(map)) => {
            for (key, entry) in map {
                if !entry.is_string() {
                    problems.insert(format!("{}.{}: expected a string", path, key));
                }
            }
        },
        (FieldKind::List, Value::Array(items)) => {
            for (i, entry) in items.iter().enumerate() {
                if !entry.is_string() {
                    problems.insert(format!("{}.{}: expected a string", path, i));
                }
            }
        },
        (FieldKind::Block(nested), Value::Array(items)) => {
            for (i, entry) in items.iter().enumerate() {
                let item_path = format!("{}.{}", path, i);
                let Value::Object(map) = entry else {
                    problems.insert(format!("{}: expected an object", item_path));
                    continue;
                };
                for key in map.keys() {
                    if nested.get(key).is_none() {
                        problems.insert(format!("{}.{}: unsupported argument", item_path, key));
                    }
                }
                for (name, nested_field) in nested.fields() {
                    let nested_path = format!("{}.{}", item_path, name);
                    match map.get(name).filter(|v| !v.is_null()) {
                        Some(v) => check_value(&nested_path, nested_field, v, problems),
                        None if nested_field.required => {
                            problems.insert(format!("{}: required field is not set", nested_path));
                        },
                        None => {},
                    }
                }
            }
        },
        (kind, _) => {
            problems.insert(format!("{}: expected {}", path, kind.type_name()));
        },
    }
}
