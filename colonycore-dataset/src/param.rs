use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Timestamp,
}

/// A declared dataset-template parameter (§4.5's parameter schema entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    pub required: bool,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub enum_values: Option<Vec<String>>,
    pub example: Option<Value>,
    pub default: Option<Value>,
}

impl ParamDef {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        ParamDef {
            name: name.into(),
            param_type,
            required: false,
            description: None,
            unit: None,
            enum_values: None,
            example: None,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_enum(mut self, values: impl IntoIterator<Item = String>) -> Self {
        self.enum_values = Some(values.into_iter().collect());
        self
    }
}

/// A coerced parameter value, ready for a runner to consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl ParamValue {
    /// Round-trips a coerced value back through `Value`, used both by tests that check
    /// coercion is idempotent and by runners that want a `serde_json`-flavored row.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::String(s) => Value::String(s.clone()),
            ParamValue::Integer(i) => Value::from(*i),
            ParamValue::Number(n) => Value::from(*n),
            ParamValue::Boolean(b) => Value::Bool(*b),
            ParamValue::Timestamp(t) => Value::String(t.to_rfc3339()),
        }
    }
}

/// One parameter-level validation failure. The whole set is returned as data, not raised as
/// an error — §4.5's "parameter validation errors (returned as a list, not an exception)".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamError {
    pub name: String,
    pub message: String,
}

impl ParamError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        ParamError { name: name.into(), message: message.into() }
    }
}

fn find_input<'a>(name: &str, input: &'a BTreeMap<String, Value>) -> Option<(&'a str, &'a Value)> {
    if let Some(value) = input.get(name) {
        return Some((name, value));
    }
    input.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(k, v)| (k.as_str(), v))
}

fn coerce(def: &ParamDef, raw: &Value) -> Result<ParamValue, String> {
    match def.param_type {
        ParamType::String => {
            let s = match raw {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err("value must be a string".to_string()),
            };
            if let Some(enum_values) = &def.enum_values {
                if !enum_values.iter().any(|v| v == &s) {
                    return Err(format!("value must be one of {}", enum_values.join(", ")));
                }
            }
            Ok(ParamValue::String(s))
        }
        ParamType::Integer => match raw {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    if f.fract() == 0.0 {
                        Ok(ParamValue::Integer(f as i64))
                    } else {
                        Err("value must be an integer".to_string())
                    }
                } else {
                    Err("value must be an integer".to_string())
                }
            }
            Value::String(s) => {
                s.parse::<i64>().map(ParamValue::Integer).map_err(|_| "value must parse as a base-10 integer".to_string())
            }
            _ => Err("value must be an integer".to_string()),
        },
        ParamType::Number => match raw {
            Value::Number(n) => n.as_f64().map(ParamValue::Number).ok_or_else(|| "value must be a number".to_string()),
            Value::String(s) => {
                s.parse::<f64>().map(ParamValue::Number).map_err(|_| "value must parse as a floating-point number".to_string())
            }
            _ => Err("value must be a number".to_string()),
        },
        ParamType::Boolean => match raw {
            Value::Bool(b) => Ok(ParamValue::Boolean(*b)),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(ParamValue::Boolean(true)),
                "false" => Ok(ParamValue::Boolean(false)),
                _ => Err("value must be true or false".to_string()),
            },
            _ => Err("value must be a boolean".to_string()),
        },
        ParamType::Timestamp => match raw {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| ParamValue::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| "value must be an RFC3339 timestamp".to_string()),
            _ => Err("value must be an RFC3339 timestamp".to_string()),
        },
    }
}

/// Matches caller-supplied names to declared parameters case-insensitively (exact match wins
/// on collision), coerces each by declared type, and reports any supplied name that matches
/// no declaration. Errors come back sorted by parameter name for deterministic output.
pub fn validate_and_coerce(
    schema: &[ParamDef],
    input: &BTreeMap<String, Value>,
) -> (BTreeMap<String, ParamValue>, Vec<ParamError>) {
    let mut cleaned = BTreeMap::new();
    let mut errors = Vec::new();
    let mut matched_keys: std::collections::HashSet<&str> = std::collections::HashSet::new();

    for def in schema {
        for key in input.keys() {
            if key.eq_ignore_ascii_case(&def.name) {
                matched_keys.insert(key.as_str());
            }
        }
        match find_input(&def.name, input) {
            Some((_, raw)) => match coerce(def, raw) {
                Ok(value) => {
                    cleaned.insert(def.name.clone(), value);
                }
                Err(message) => errors.push(ParamError::new(&def.name, message)),
            },
            None => {
                if def.required {
                    errors.push(ParamError::new(&def.name, "required parameter missing"));
                } else if let Some(default) = &def.default {
                    match coerce(def, default) {
                        Ok(value) => {
                            cleaned.insert(def.name.clone(), value);
                        }
                        Err(message) => errors.push(ParamError::new(&def.name, message)),
                    }
                }
            }
        }
    }

    for key in input.keys() {
        if !matched_keys.contains(key.as_str()) {
            errors.push(ParamError::new(key, "parameter not declared"));
        }
    }

    errors.sort_by(|a, b| a.name.cmp(&b.name));
    (cleaned, errors)
}
