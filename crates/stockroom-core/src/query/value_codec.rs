//! Value codec for encoding/decoding rows to/from bytes.

use chrono::DateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::Error;
use crate::value::Value;

/// Type tag for encoded values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueTag {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Decimal = 4,
    String = 5,
    Timestamp = 6,
    Uuid = 7,
}

impl TryFrom<u8> for ValueTag {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ValueTag::Null),
            1 => Ok(ValueTag::Bool),
            2 => Ok(ValueTag::Int),
            3 => Ok(ValueTag::Float),
            4 => Ok(ValueTag::Decimal),
            5 => Ok(ValueTag::String),
            6 => Ok(ValueTag::Timestamp),
            7 => Ok(ValueTag::Uuid),
            _ => Err(Error::InvalidData(format!("Unknown value tag: {}", value))),
        }
    }
}

/// Encode a list of field name/value pairs to bytes.
///
/// Format:
/// - Field count (4 bytes, little-endian)
/// - For each field:
///   - Field name length (2 bytes, little-endian)
///   - Field name (UTF-8 bytes)
///   - Value tag (1 byte)
///   - Value data (variable length, depends on type)
pub fn encode_row(fields: &[(String, Value)]) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();

    let count = u32::try_from(fields.len())
        .map_err(|_| Error::Serialization("Too many fields".into()))?;
    buf.extend_from_slice(&count.to_le_bytes());

    for (name, value) in fields {
        let name_bytes = name.as_bytes();
        let name_len = u16::try_from(name_bytes.len())
            .map_err(|_| Error::Serialization("Field name too long".into()))?;
        buf.extend_from_slice(&name_len.to_le_bytes());
        buf.extend_from_slice(name_bytes);

        encode_value(&mut buf, value)?;
    }

    Ok(buf)
}

/// Decode bytes back to field name/value pairs.
pub fn decode_row(data: &[u8]) -> Result<Vec<(String, Value)>, Error> {
    let mut cursor = Cursor { data, pos: 0 };

    let count = u32::from_le_bytes(cursor.take_array("field count")?) as usize;
    let mut fields = Vec::with_capacity(count.min(64));

    for _ in 0..count {
        let name_len = u16::from_le_bytes(cursor.take_array("field name length")?) as usize;
        let name = String::from_utf8(cursor.take(name_len, "field name")?.to_vec())
            .map_err(|_| Error::InvalidData("Invalid UTF-8 in field name".into()))?;
        let value = decode_value(&mut cursor)?;
        fields.push((name, value));
    }

    if cursor.pos != data.len() {
        return Err(Error::InvalidData("Trailing bytes after row".into()));
    }

    Ok(fields)
}

fn encode_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), Error> {
    match value {
        Value::Null => buf.push(ValueTag::Null as u8),
        Value::Bool(b) => {
            buf.push(ValueTag::Bool as u8);
            buf.push(u8::from(*b));
        }
        Value::Int(i) => {
            buf.push(ValueTag::Int as u8);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        Value::Float(f) => {
            buf.push(ValueTag::Float as u8);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        Value::Decimal(d) => {
            buf.push(ValueTag::Decimal as u8);
            buf.extend_from_slice(&d.serialize());
        }
        Value::String(s) => {
            buf.push(ValueTag::String as u8);
            let len = u32::try_from(s.len())
                .map_err(|_| Error::Serialization("String too long".into()))?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Timestamp(t) => {
            buf.push(ValueTag::Timestamp as u8);
            buf.extend_from_slice(&t.timestamp_micros().to_le_bytes());
        }
        Value::Uuid(u) => {
            buf.push(ValueTag::Uuid as u8);
            buf.extend_from_slice(u.as_bytes());
        }
    }
    Ok(())
}

fn decode_value(cursor: &mut Cursor<'_>) -> Result<Value, Error> {
    let tag = ValueTag::try_from(cursor.take_array::<1>("value tag")?[0])?;

    let value = match tag {
        ValueTag::Null => Value::Null,
        ValueTag::Bool => match cursor.take_array::<1>("bool")?[0] {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            other => {
                return Err(Error::InvalidData(format!("Invalid bool byte: {}", other)));
            }
        },
        ValueTag::Int => Value::Int(i64::from_le_bytes(cursor.take_array("int")?)),
        ValueTag::Float => Value::Float(f64::from_le_bytes(cursor.take_array("float")?)),
        ValueTag::Decimal => Value::Decimal(Decimal::deserialize(cursor.take_array("decimal")?)),
        ValueTag::String => {
            let len = u32::from_le_bytes(cursor.take_array("string length")?) as usize;
            let bytes = cursor.take(len, "string")?;
            Value::String(
                String::from_utf8(bytes.to_vec())
                    .map_err(|_| Error::InvalidData("Invalid UTF-8 in string".into()))?,
            )
        }
        ValueTag::Timestamp => {
            let micros = i64::from_le_bytes(cursor.take_array("timestamp")?);
            let ts = DateTime::from_timestamp_micros(micros)
                .ok_or_else(|| Error::InvalidData(format!("Timestamp out of range: {}", micros)))?;
            Value::Timestamp(ts)
        }
        ValueTag::Uuid => Value::Uuid(Uuid::from_bytes(cursor.take_array("uuid")?)),
    };

    Ok(value)
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], Error> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| Error::InvalidData(format!("Data too short for {}", what)))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], Error> {
        let slice = self.take(N, what)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_row_roundtrip() {
        let fields = vec![
            ("id".to_string(), Value::Int(12)),
            ("price".to_string(), Value::Decimal(Decimal::new(1999, 2))),
            ("sku".to_string(), Value::Uuid(Uuid::new_v4())),
            ("weight".to_string(), Value::Float(0.75)),
            ("is_active".to_string(), Value::Bool(true)),
            ("description".to_string(), Value::Null),
            ("name".to_string(), Value::from("Trail runner \u{2013} blue")),
            (
                "created_at".to_string(),
                Value::Timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()),
            ),
        ];

        let bytes = encode_row(&fields).unwrap();
        let decoded = decode_row(&bytes).unwrap();

        assert_eq!(decoded, fields);
    }

    #[test]
    fn test_decimal_keeps_scale() {
        let fields = vec![("price".to_string(), Value::Decimal(Decimal::new(1000, 2)))];
        let decoded = decode_row(&encode_row(&fields).unwrap()).unwrap();

        assert_eq!(decoded[0].1.as_decimal().unwrap().to_string(), "10.00");
    }

    #[test]
    fn test_truncated_data() {
        let fields = vec![("name".to_string(), Value::from("Size"))];
        let bytes = encode_row(&fields).unwrap();

        assert!(decode_row(&bytes[..bytes.len() - 1]).is_err());
        assert!(decode_row(&[]).is_err());
    }

    #[test]
    fn test_unknown_tag() {
        let mut bytes = encode_row(&[("x".to_string(), Value::Null)]).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 99;

        assert!(matches!(decode_row(&bytes), Err(Error::InvalidData(_))));
    }
}
