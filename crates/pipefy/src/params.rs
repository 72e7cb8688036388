//! Parameter resolution.
//!
//! Node-level parameters come from the node configuration; an input item may
//! override any of them through its own `parameters` object.

use serde_json::{Map, Value};

use crate::PipefyError;

/// Key under which an input item carries per-item parameter overrides.
pub const ITEM_OVERRIDES_KEY: &str = "parameters";

/// Resolved parameters for one item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: Map<String, Value>,
}

impl Parameters {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Apply the item's `parameters` overrides on top of these values.
    pub fn for_item(&self, item: &Value) -> Parameters {
        let mut values = self.values.clone();
        if let Some(overrides) = item.get(ITEM_OVERRIDES_KEY).and_then(Value::as_object) {
            for (key, value) in overrides {
                values.insert(key.clone(), value.clone());
            }
        }
        Parameters { values }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// A required scalar; missing, null, or empty values are rejected.
    pub fn required(&self, name: &str) -> Result<String, PipefyError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Err(PipefyError::MissingParameter(name.to_string())),
            Some(value) => match scalar_string(value) {
                Some(s) if !s.is_empty() => Ok(s),
                Some(_) => Err(PipefyError::MissingParameter(name.to_string())),
                None => Err(PipefyError::InvalidParameter {
                    name: name.to_string(),
                    reason: "expected a string or number".to_string(),
                }),
            },
        }
    }

    /// An optional scalar, `None` when absent or empty.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .and_then(scalar_string)
            .filter(|s| !s.is_empty())
    }

    pub fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    /// A collection parameter (`updateFields`, `pipeFields`, …).
    ///
    /// Absent or null collections read as empty; other non-object values are
    /// rejected.
    pub fn collection(&self, name: &str) -> Result<Map<String, Value>, PipefyError> {
        match self.values.get(name) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(PipefyError::InvalidParameter {
                name: name.to_string(),
                reason: "expected an object".to_string(),
            }),
        }
    }
}

/// Render a JSON scalar as the string the API expects.
///
/// Returns `None` for null, arrays, and objects.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
