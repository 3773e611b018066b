//! Raw user-preference values as delivered by the settings store.
//!
//! The store hands back either a bare primitive or a "slicer" object that
//! carries the primitive under a `value` field. Both shapes are folded into
//! [`RawSetting`] and read through [`RawSetting::value`].

use serde_json::Value;

/// A single raw setting value
#[derive(Debug, Clone, PartialEq)]
pub enum RawSetting {
    Primitive(Value),
    Wrapped { value: Value },
}

impl RawSetting {
    /// Classify a JSON value by shape. `null` means the setting is absent.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Object(mut map) if map.contains_key("value") => {
                let inner = map.remove("value").unwrap_or(Value::Null);
                if inner.is_null() {
                    None
                } else {
                    Some(RawSetting::Wrapped { value: inner })
                }
            }
            other => Some(RawSetting::Primitive(other)),
        }
    }

    /// The underlying primitive, whatever shape it arrived in
    pub fn value(&self) -> &Value {
        match self {
            RawSetting::Primitive(v) => v,
            RawSetting::Wrapped { value } => value,
        }
    }

    /// Trimmed string form; numbers and booleans are stringified
    pub fn as_text(&self) -> Option<String> {
        let text = match self.value() {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Numeric form. Strings are parsed leniently ("120", " 5 ", "3.9").
    pub fn as_number(&self) -> Option<f64> {
        let number = match self.value() {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        number.is_finite().then_some(number)
    }

    /// Boolean form. Accepts `true`, `"true"`, `"on"`, `"yes"`, `1`.
    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Some(true),
                "false" | "off" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}
