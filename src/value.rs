//! # Value Model - Decoded Object Graph
//!
//! ## Purpose
//!
//! The tagged union the codec reads into and writes from. Containers own their
//! children directly; the object-reference indirection of the wire format is
//! an encoding detail and never leaks into this model. `Dict` preserves entry
//! order as a `Vec` of pairs: decode order follows the wire, encode order is
//! whatever the caller built, which keeps round-trips deterministic. Key
//! uniqueness is the caller's responsibility and is not re-validated here.

use crate::constants::APPLE_EPOCH_OFFSET_SECS;

/// A single node in a property list object graph
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Explicit null marker
    Null,
    /// Boolean scalar
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Real(f64),
    /// Seconds since 2001-01-01T00:00:00Z (the Apple epoch)
    Timestamp(f64),
    /// Opaque byte blob
    Bytes(Vec<u8>),
    /// Text; stored on the wire as ASCII or UTF-16BE, one logical type here
    Text(String),
    /// Ordered list
    Array(Vec<Value>),
    /// Ordered string-keyed map with unique keys
    Dict(Vec<(String, Value)>),
}

impl Value {
    /// Build a timestamp from conventional Unix-epoch seconds
    pub fn timestamp_from_unix(unix_secs: f64) -> Self {
        Value::Timestamp(unix_secs - APPLE_EPOCH_OFFSET_SECS)
    }

    /// Unix-epoch seconds of a `Timestamp`, `None` for other variants
    pub fn unix_seconds(&self) -> Option<f64> {
        match self {
            Value::Timestamp(secs) => Some(secs + APPLE_EPOCH_OFFSET_SECS),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Dict(entries) => Some(entries),
            _ => None,
        }
    }

    /// First value stored under `key` in a `Dict`, `None` otherwise
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<(String, Value)>> for Value {
    fn from(v: Vec<(String, Value)>) -> Self {
        Value::Dict(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_reject_other_variants() {
        let v = Value::Int(42);
        assert_eq!(v.as_int(), Some(42));
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.as_str(), None);
        assert_eq!(Value::Text("x".into()).as_str(), Some("x"));
    }

    #[test]
    fn dict_lookup_finds_first_match() {
        let dict = Value::Dict(vec![
            ("Name".to_string(), Value::Text("Goodbye".into())),
            ("Rating".to_string(), Value::Int(100)),
        ]);
        assert_eq!(dict.get("Rating").and_then(Value::as_int), Some(100));
        assert!(dict.get("Missing").is_none());
        assert!(Value::Null.get("Name").is_none());
    }

    #[test]
    fn unix_conversion_uses_exact_epoch_offset() {
        let v = Value::timestamp_from_unix(978_307_200.0);
        assert_eq!(v, Value::Timestamp(0.0));
        assert_eq!(v.unix_seconds(), Some(978_307_200.0));
        assert_eq!(Value::Int(1).unix_seconds(), None);
    }
}
