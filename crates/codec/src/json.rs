//! Textual encoding: JSON.
//!
//! JSON has no bytes type, so bytes travel as `{"$bytes": "<base64>"}`. To
//! keep that tag unambiguous, every map key starting with `$` is written with
//! one extra leading `$` and unescaped on the way back.
//!
//! Decoding has no nesting limit, so anything `encode` writes reads back.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{Deserializer, Map, Number, Value};

use crate::errors::CodecError;
use crate::value::{DataMap, DataValue};

const BYTES_TAG: &str = "$bytes";

pub fn encode(map: &DataMap) -> Result<Vec<u8>, CodecError> {
    let value = write_map(map)?;
    Ok(serde_json::to_vec(&value)?)
}

pub fn decode(bytes: &[u8]) -> Result<DataMap, CodecError> {
    let mut de = Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;

    match read_value(value)? {
        DataValue::Map(map) => Ok(map),
        other => Err(CodecError::NotAMap(other.type_name())),
    }
}

fn write_map(map: &DataMap) -> Result<Value, CodecError> {
    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        let key = if key.starts_with('$') {
            format!("${key}")
        } else {
            key.clone()
        };
        out.insert(key, write_value(value)?);
    }
    Ok(Value::Object(out))
}

fn write_value(value: &DataValue) -> Result<Value, CodecError> {
    Ok(match value {
        DataValue::Null => Value::Null,
        DataValue::Bool(b) => Value::Bool(*b),
        DataValue::Int(i) => Value::Number(Number::from(*i)),
        DataValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| CodecError::Unrepresentable(format!("float {f} as JSON")))?,
        DataValue::String(s) => Value::String(s.clone()),
        DataValue::Bytes(b) => {
            let mut tagged = Map::with_capacity(1);
            tagged.insert(BYTES_TAG.to_string(), Value::String(STANDARD.encode(b)));
            Value::Object(tagged)
        }
        DataValue::List(items) => {
            Value::Array(items.iter().map(write_value).collect::<Result<_, _>>()?)
        }
        DataValue::Map(map) => write_map(map)?,
    })
}

fn read_value(value: Value) -> Result<DataValue, CodecError> {
    Ok(match value {
        Value::Null => DataValue::Null,
        Value::Bool(b) => DataValue::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                DataValue::Int(i)
            } else if n.is_f64() {
                // `is_f64` guarantees `as_f64` is `Some`.
                DataValue::Float(n.as_f64().unwrap_or_default())
            } else {
                return Err(CodecError::Unrepresentable(format!("integer {n}")));
            }
        }
        Value::String(s) => DataValue::String(s),
        Value::Array(items) => DataValue::List(
            items
                .into_iter()
                .map(read_value)
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(object) => read_object(object)?,
    })
}

fn read_object(object: Map<String, Value>) -> Result<DataValue, CodecError> {
    if object.len() == 1 {
        if let Some(Value::String(encoded)) = object.get(BYTES_TAG) {
            return Ok(DataValue::Bytes(STANDARD.decode(encoded)?));
        }
    }

    let mut map = DataMap::new();
    for (key, value) in object {
        let key = match key.strip_prefix("$$") {
            Some(rest) => format!("${rest}"),
            None => key,
        };
        map.insert(key, read_value(value)?);
    }
    Ok(DataValue::Map(map))
}
