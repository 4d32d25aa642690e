//! Attribute value types.
//!
//! This module defines the [`AttrValue`] enum, the single recursive shape
//! shared by the codec and the query compiler: a value is a scalar, a nested
//! map, or an ordered sequence of values. The enum is serde-untagged, so on
//! the wire it is indistinguishable from plain JSON.
//!
//! # Supported Types
//!
//! - **Text** - String data
//! - **Integer** - 64-bit signed integers
//! - **Float** - 64-bit floating-point numbers
//! - **Bool** - true/false values
//! - **Sequence** - ordered sequences of values
//! - **Nested** - nested attribute maps
//! - **Null** - explicit null values
//!
//! # Examples
//!
//! ```
//! use mejiro::attributes::value::AttrValue;
//!
//! let value = AttrValue::Text("hello".to_string());
//! assert_eq!(value.as_text(), Some("hello"));
//!
//! let value = AttrValue::Integer(42);
//! assert_eq!(value.as_i64(), Some(42));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value stored under an attribute name.
///
/// Scalar variants mirror the primitive types records are built from;
/// `Sequence` and `Nested` carry composite values without flattening them.
/// Untagged serde keeps the serialized form identical to the JSON the
/// record itself produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Explicit null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Ordered sequence of values.
    Sequence(Vec<AttrValue>),
    /// Nested attribute map.
    Nested(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    /// Whether this is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a boolean if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to an integer if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert to a float. Integer values widen losslessly.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the elements if this is a sequence value.
    pub fn as_sequence(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::Sequence(elements) => Some(elements),
            _ => None,
        }
    }

    /// Get the fields if this is a nested map value.
    pub fn as_nested(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Nested(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<Value> for AttrValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(b) => AttrValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttrValue::Integer(i),
                None => AttrValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => AttrValue::Text(s),
            Value::Array(elements) => {
                AttrValue::Sequence(elements.into_iter().map(AttrValue::from).collect())
            }
            Value::Object(fields) => AttrValue::Nested(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, AttrValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<AttrValue> for Value {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::Null => Value::Null,
            AttrValue::Bool(b) => Value::Bool(b),
            AttrValue::Integer(i) => Value::from(i),
            AttrValue::Float(f) => Value::from(f),
            AttrValue::Text(s) => Value::String(s),
            AttrValue::Sequence(elements) => {
                Value::Array(elements.into_iter().map(Value::from).collect())
            }
            AttrValue::Nested(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Integer(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_value() {
        assert_eq!(AttrValue::from(json!(null)), AttrValue::Null);
        assert_eq!(AttrValue::from(json!(true)), AttrValue::Bool(true));
        assert_eq!(AttrValue::from(json!(42)), AttrValue::Integer(42));
        assert_eq!(AttrValue::from(json!(1.5)), AttrValue::Float(1.5));
        assert_eq!(
            AttrValue::from(json!("hello")),
            AttrValue::Text("hello".to_string())
        );

        let sequence = AttrValue::from(json!([1, "two"]));
        assert_eq!(
            sequence,
            AttrValue::Sequence(vec![
                AttrValue::Integer(1),
                AttrValue::Text("two".to_string())
            ])
        );

        let nested = AttrValue::from(json!({"inner": {"leaf": 7}}));
        let fields = nested.as_nested().unwrap();
        let inner = fields.get("inner").unwrap().as_nested().unwrap();
        assert_eq!(inner.get("leaf"), Some(&AttrValue::Integer(7)));
    }

    #[test]
    fn test_untagged_round_trip() {
        let original = json!({
            "name": "April",
            "age": 17,
            "grade": 3.5,
            "active": true,
            "tags": ["a", "b"],
            "address": {"city": "nyc", "zip": null}
        });

        let value: AttrValue = serde_json::from_value(original.clone()).unwrap();
        let back = Value::from(value);
        assert_eq!(back, original);
    }

    #[test]
    fn test_accessors() {
        assert!(AttrValue::Null.is_null());
        assert_eq!(AttrValue::Bool(true).as_bool(), Some(true));
        assert_eq!(AttrValue::Integer(3).as_i64(), Some(3));
        assert_eq!(AttrValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(AttrValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(AttrValue::Text("x".to_string()).as_text(), Some("x"));
        assert_eq!(AttrValue::Text("x".to_string()).as_i64(), None);
        assert_eq!(
            AttrValue::Sequence(vec![AttrValue::Null]).as_sequence().map(<[AttrValue]>::len),
            Some(1)
        );
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(AttrValue::from("text"), AttrValue::Text("text".to_string()));
        assert_eq!(AttrValue::from(7i64), AttrValue::Integer(7));
        assert_eq!(AttrValue::from(false), AttrValue::Bool(false));
    }
}
