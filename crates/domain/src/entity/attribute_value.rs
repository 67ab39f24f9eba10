//! Typed attribute values attached to entities.

use serde::{Deserialize, Serialize};

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u8> for AttributeValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_string_variant_as_plain_string() {
        let val = AttributeValue::from("battery");
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "\"battery\"");
    }

    #[test]
    fn should_serialize_position_as_number() {
        let val = AttributeValue::from(70_u8);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "70");
    }

    #[test]
    fn should_serialize_voltage_as_float() {
        let val = AttributeValue::from(12.3);
        let json = serde_json::to_string(&val).unwrap();
        assert_eq!(json, "12.3");
    }

    #[test]
    fn should_deserialize_json_object_as_json_variant() {
        let json = r#"{"nested": "value"}"#;
        let val: AttributeValue = serde_json::from_str(json).unwrap();
        assert!(matches!(val, AttributeValue::Json(_)));
    }

    #[test]
    fn should_deserialize_whole_number_as_int() {
        let val: AttributeValue = serde_json::from_str("15").unwrap();
        assert_eq!(val, AttributeValue::Int(15));
    }
}
