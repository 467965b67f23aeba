//! Binary encoding: MessagePack.

use rmpv::Value;

use crate::errors::CodecError;
use crate::value::{DataMap, DataValue};

pub fn encode(map: &DataMap) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, &write_map(map))
        .map_err(|e| CodecError::MsgPackEncode(e.to_string()))?;
    Ok(buf)
}

pub fn decode(bytes: &[u8]) -> Result<DataMap, CodecError> {
    let mut cursor = bytes;
    let value = rmpv::decode::read_value(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(CodecError::TrailingBytes(cursor.len()));
    }
    match read_value(value)? {
        DataValue::Map(map) => Ok(map),
        other => Err(CodecError::NotAMap(other.type_name())),
    }
}

fn write_map(map: &DataMap) -> Value {
    Value::Map(
        map.iter()
            .map(|(k, v)| (Value::from(k.as_str()), write_value(v)))
            .collect(),
    )
}

fn write_value(value: &DataValue) -> Value {
    match value {
        DataValue::Null => Value::Nil,
        DataValue::Bool(b) => Value::Boolean(*b),
        DataValue::Int(i) => Value::from(*i),
        DataValue::Float(f) => Value::F64(*f),
        DataValue::String(s) => Value::from(s.as_str()),
        DataValue::Bytes(b) => Value::Binary(b.clone()),
        DataValue::List(items) => Value::Array(items.iter().map(write_value).collect()),
        DataValue::Map(map) => write_map(map),
    }
}

fn read_value(value: Value) -> Result<DataValue, CodecError> {
    Ok(match value {
        Value::Nil => DataValue::Null,
        Value::Boolean(b) => DataValue::Bool(b),
        Value::Integer(i) => match i.as_i64() {
            Some(i) => DataValue::Int(i),
            None => return Err(CodecError::Unrepresentable(format!("integer {i}"))),
        },
        Value::F32(f) => DataValue::Float(f64::from(f)),
        Value::F64(f) => DataValue::Float(f),
        Value::String(s) => DataValue::String(
            s.into_str()
                .ok_or_else(|| CodecError::Unrepresentable("a non-UTF-8 string".into()))?,
        ),
        Value::Binary(b) => DataValue::Bytes(b),
        Value::Array(items) => DataValue::List(
            items
                .into_iter()
                .map(read_value)
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(entries) => {
            let mut map = DataMap::new();
            for (key, value) in entries {
                let Value::String(key) = key else {
                    return Err(CodecError::Unrepresentable(format!("map key {key}")));
                };
                let key = key
                    .into_str()
                    .ok_or_else(|| CodecError::Unrepresentable("a non-UTF-8 map key".into()))?;
                map.insert(key, read_value(value)?);
            }
            DataValue::Map(map)
        }
        Value::Ext(tag, _) => {
            return Err(CodecError::Unrepresentable(format!(
                "MessagePack extension type {tag}"
            )))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(value: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, value).unwrap();
        buf
    }

    #[test]
    fn test_bytes_and_floats_keep_their_types() {
        let map = DataMap::from([
            ("blob".to_string(), DataValue::Bytes(vec![1, 2, 3])),
            ("ratio".to_string(), DataValue::Float(0.5)),
        ]);
        let decoded = rmpv::decode::read_value(&mut encode(&map).unwrap().as_slice()).unwrap();
        let Value::Map(entries) = decoded else {
            panic!("expected a map");
        };
        assert_eq!(entries[0].1, Value::Binary(vec![1, 2, 3]));
        assert_eq!(entries[1].1, Value::F64(0.5));
    }

    #[test]
    fn test_rejects_values_outside_the_data_model() {
        let big = raw(&Value::Map(vec![(Value::from("n"), Value::from(u64::MAX))]));
        assert!(matches!(decode(&big), Err(CodecError::Unrepresentable(_))));

        let int_key = raw(&Value::Map(vec![(Value::from(1), Value::Nil)]));
        assert!(matches!(decode(&int_key), Err(CodecError::Unrepresentable(_))));

        let ext = raw(&Value::Map(vec![(Value::from("e"), Value::Ext(7, vec![0]))]));
        assert!(matches!(decode(&ext), Err(CodecError::Unrepresentable(_))));
    }

    #[test]
    fn test_top_level_must_be_a_map() {
        assert!(matches!(
            decode(&raw(&Value::from("hi"))),
            Err(CodecError::NotAMap("a string"))
        ));
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut bytes = encode(&DataMap::new()).unwrap();
        bytes.push(0xc0);
        assert!(matches!(decode(&bytes), Err(CodecError::TrailingBytes(1))));
    }

    #[test]
    fn test_f32_widens_to_float() {
        let bytes = raw(&Value::Map(vec![(Value::from("f"), Value::F32(1.5))]));
        assert_eq!(decode(&bytes).unwrap()["f"], DataValue::Float(1.5));
    }
}
