//! Typed route parameters and the per-route parse map

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Target type of a parse-map entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Number,
    Boolean,
}

/// A parameter value after coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Parameters of one route in a resolved target
pub type Params = HashMap<String, ParamValue>;

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    /// Renders the value the way it appears in a path: whole numbers without a fraction
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(value) => write!(f, "{}", value),
            ParamValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", *value as i64)
            }
            ParamValue::Number(value) => write!(f, "{}", value),
            ParamValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// Coerces a raw captured value, `None` when it does not fit the type
///
/// - `String` passes through.
/// - `Number` accepts finite decimal numbers.
/// - `Boolean` accepts `true` / `false` in any ASCII case.
///
/// # Examples
///
/// ```
/// use deeplink_router::{coerce_param, ParamType, ParamValue};
///
/// assert_eq!(coerce_param("8536", ParamType::Number), Some(ParamValue::Number(8536.0)));
/// assert_eq!(coerce_param("abc", ParamType::Number), None);
/// assert_eq!(coerce_param("TRUE", ParamType::Boolean), Some(ParamValue::Bool(true)));
/// ```
pub fn coerce_param(raw: &str, ty: ParamType) -> Option<ParamValue> {
    match ty {
        ParamType::String => Some(ParamValue::Text(raw.to_string())),
        ParamType::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && !raw.trim().is_empty())
            .map(ParamValue::Number),
        ParamType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Some(ParamValue::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Some(ParamValue::Bool(false))
            } else {
                None
            }
        }
    }
}
