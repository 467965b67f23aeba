//! The encoding-neutral data model.

use std::collections::BTreeMap;

/// A string-keyed map of structured values; the unit of encode and decode.
pub type DataMap = BTreeMap<String, DataValue>;

/// One structured value.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Opaque bytes.
    Bytes(Vec<u8>),
    List(Vec<DataValue>),
    Map(DataMap),
}

impl DataValue {
    /// Short name of the value's shape, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "a boolean",
            DataValue::Int(_) => "an integer",
            DataValue::Float(_) => "a float",
            DataValue::String(_) => "a string",
            DataValue::Bytes(_) => "bytes",
            DataValue::List(_) => "a list",
            DataValue::Map(_) => "a map",
        }
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<Vec<u8>> for DataValue {
    fn from(value: Vec<u8>) -> Self {
        DataValue::Bytes(value)
    }
}

impl From<DataMap> for DataValue {
    fn from(value: DataMap) -> Self {
        DataValue::Map(value)
    }
}
