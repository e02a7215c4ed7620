//! Hashable key projection of dynamic values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::Value;

/// A value usable as a hash-map key.
///
/// Integers collapse into `Int` so that an `Int32` field can be matched
/// against an `Int64` field. Unsigned values above `i64::MAX` become `UInt`.
/// Floating point values have no key form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Timestamp(i64),
    String(String),
    Bytes(Vec<u8>),
    Uuid([u8; 16]),
    /// Key of a list value, element by element.
    Composite(Vec<Key>),
    /// Key of a record value, field by field in field order.
    Fields(Vec<(String, Key)>),
}

impl TryFrom<&Value> for Key {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => Key::Null,
            Value::Bool(b) => Key::Bool(*b),
            Value::Int32(i) => Key::Int(*i as i64),
            Value::Int64(i) => Key::Int(*i),
            Value::UInt64(u) => Key::from(*u),
            Value::Timestamp(t) => Key::Timestamp(*t),
            Value::String(s) => Key::String(s.clone()),
            Value::Bytes(b) => Key::Bytes(b.clone()),
            Value::Uuid(u) => Key::Uuid(*u),
            Value::List(items) => Key::Composite(
                items
                    .iter()
                    .map(Key::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Record(row) => Key::Fields(
                row.iter()
                    .map(|(name, v)| -> Result<(String, Key), Error> {
                        Ok((name.to_string(), Key::try_from(v)?))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Float32(_) | Value::Float64(_) => {
                return Err(Error::UnhashableKey { kind: value.kind() })
            }
        })
    }
}

impl TryFrom<Value> for Key {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Key::try_from(&value)
    }
}

impl From<bool> for Key {
    fn from(v: bool) -> Self {
        Key::Bool(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Int(v as i64)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<u64> for Key {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Key::Int(i),
            Err(_) => Key::UInt(v),
        }
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::String(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::String(v)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Bool(b) => write!(f, "{b}"),
            Key::Int(i) => write!(f, "{i}"),
            Key::UInt(u) => write!(f, "{u}"),
            Key::Timestamp(t) => write!(f, "@{t}"),
            Key::String(s) => write!(f, "{s:?}"),
            Key::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Key::Uuid(u) => f.write_str(&hex::encode(u)),
            Key::Composite(parts) => {
                let parts: Vec<String> = parts.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(", "))
            }
            Key::Fields(fields) => {
                let parts: Vec<String> =
                    fields.iter().map(|(n, k)| format!("{n}={k}")).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}
