//! # Variant: self-describing dynamic values
//!
//! Contract-call arguments and contract metadata are dynamically typed. A
//! [`Variant`] is the closed set of shapes they may take, with exactly one
//! binary encoding per logical value:
//!
//! ```text
//! u16 LE type code ‖ payload
//! ```
//!
//! | code | kind   | payload                                               |
//! |------|--------|-------------------------------------------------------|
//! | 0    | null   | none                                                  |
//! | 1-4  | u8..64 | raw LE, smallest width that holds the value           |
//! | 5-8  | i8..64 | raw LE, smallest width, negative values only          |
//! | 12   | list   | u32 count ‖ elements                                  |
//! | 31   | bool   | one byte, 0 or 1                                      |
//! | 32   | string | u32 length ‖ UTF-8                                    |
//! | 136  | object | u32 count ‖ (u32 key length ‖ key ‖ value), keys sorted |
//!
//! The minimal-width rule is part of the canonical form. So is key order:
//! objects are held in a `BTreeMap`, so construction order never leaks into
//! the bytes.
//!
//! Nesting is capped at [`VARIANT_MAX_DEPTH`] on both encode and decode.
//! Contract arguments come from untrusted callers; a 10 000-deep list must
//! produce an error, not a stack overflow.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::CodecError;
use crate::config::VARIANT_MAX_DEPTH;

// ---------------------------------------------------------------------------
// Type codes
// ---------------------------------------------------------------------------

pub const CODE_NULL: u16 = 0;
pub const CODE_U8: u16 = 1;
pub const CODE_U16: u16 = 2;
pub const CODE_U32: u16 = 3;
pub const CODE_U64: u16 = 4;
pub const CODE_I8: u16 = 5;
pub const CODE_I16: u16 = 6;
pub const CODE_I32: u16 = 7;
pub const CODE_I64: u16 = 8;
pub const CODE_LIST: u16 = 12;
pub const CODE_BOOL: u16 = 31;
pub const CODE_STRING: u16 = 32;
pub const CODE_OBJECT: u16 = 136;

/// A dynamically typed value.
///
/// Non-negative integers are always held as [`Variant::UInt`]; the `From`
/// conversions normalize, so `Variant::from(5i64) == Variant::from(5u64)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Variant {
    #[default]
    Null,
    Bool(bool),
    UInt(u64),
    /// Only ever negative once normalized.
    Int(i64),
    String(String),
    List(Vec<Variant>),
    Object(BTreeMap<String, Variant>),
}

impl Variant {
    /// Canonical binary encoding.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode_into(&mut out, 0)?;
        Ok(out)
    }

    /// Size of the canonical encoding in bytes.
    pub fn encoded_len(&self) -> Result<usize, CodecError> {
        self.encode().map(|bytes| bytes.len())
    }

    fn encode_into(&self, out: &mut Vec<u8>, depth: usize) -> Result<(), CodecError> {
        if depth > VARIANT_MAX_DEPTH {
            return Err(CodecError::RecursionLimit(VARIANT_MAX_DEPTH));
        }
        match self {
            Variant::Null => put_code(out, CODE_NULL),
            Variant::Bool(value) => {
                put_code(out, CODE_BOOL);
                out.push(u8::from(*value));
            }
            Variant::UInt(value) => encode_unsigned(out, *value),
            Variant::Int(value) if *value >= 0 => encode_unsigned(out, *value as u64),
            Variant::Int(value) => encode_signed(out, *value),
            Variant::String(value) => {
                put_code(out, CODE_STRING);
                put_len(out, value.len())?;
                out.extend_from_slice(value.as_bytes());
            }
            Variant::List(items) => {
                put_code(out, CODE_LIST);
                put_len(out, items.len())?;
                for item in items {
                    item.encode_into(out, depth + 1)?;
                }
            }
            Variant::Object(fields) => {
                put_code(out, CODE_OBJECT);
                put_len(out, fields.len())?;
                for (key, value) in fields {
                    put_len(out, key.len())?;
                    out.extend_from_slice(key.as_bytes());
                    value.encode_into(out, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    /// Decodes exactly one value. Only the canonical encoding is accepted:
    /// narrowest integer widths, bools of 0 or 1, strictly ascending object
    /// keys, no trailing bytes. `decode(b)?.encode()? == b` always holds.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader { data: bytes, pos: 0 };
        let value = reader.read_variant(0)?;
        let rest = bytes.len() - reader.pos;
        if rest != 0 {
            return Err(CodecError::TrailingBytes(rest));
        }
        Ok(value)
    }

    /// Converts a JSON value. Floats are rejected: there is no canonical
    /// encoding for them.
    pub fn from_json(value: &Value) -> Result<Self, CodecError> {
        Self::from_json_at(value, 0)
    }

    fn from_json_at(value: &Value, depth: usize) -> Result<Self, CodecError> {
        if depth > VARIANT_MAX_DEPTH {
            return Err(CodecError::RecursionLimit(VARIANT_MAX_DEPTH));
        }
        Ok(match value {
            Value::Null => Variant::Null,
            Value::Bool(b) => Variant::Bool(*b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Variant::UInt(u)
                } else if let Some(i) = n.as_i64() {
                    Variant::from(i)
                } else {
                    return Err(CodecError::UnsupportedValue(format!("number {n}")));
                }
            }
            Value::String(s) => Variant::String(s.clone()),
            Value::Array(items) => Variant::List(
                items
                    .iter()
                    .map(|item| Self::from_json_at(item, depth + 1))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => Variant::Object(
                map.iter()
                    .map(|(k, v)| Ok((k.clone(), Self::from_json_at(v, depth + 1)?)))
                    .collect::<Result<_, CodecError>>()?,
            ),
        })
    }

    /// Converts back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Variant::Null => Value::Null,
            Variant::Bool(b) => Value::Bool(*b),
            Variant::UInt(u) => Value::from(*u),
            Variant::Int(i) => Value::from(*i),
            Variant::String(s) => Value::String(s.clone()),
            Variant::List(items) => Value::Array(items.iter().map(Variant::to_json).collect()),
            Variant::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }
}

fn put_code(out: &mut Vec<u8>, code: u16) {
    out.extend_from_slice(&code.to_le_bytes());
}

fn put_len(out: &mut Vec<u8>, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

fn encode_unsigned(out: &mut Vec<u8>, value: u64) {
    if let Ok(v) = u8::try_from(value) {
        put_code(out, CODE_U8);
        out.push(v);
    } else if let Ok(v) = u16::try_from(value) {
        put_code(out, CODE_U16);
        out.extend_from_slice(&v.to_le_bytes());
    } else if let Ok(v) = u32::try_from(value) {
        put_code(out, CODE_U32);
        out.extend_from_slice(&v.to_le_bytes());
    } else {
        put_code(out, CODE_U64);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

fn encode_signed(out: &mut Vec<u8>, value: i64) {
    if let Ok(v) = i8::try_from(value) {
        put_code(out, CODE_I8);
        out.extend_from_slice(&v.to_le_bytes());
    } else if let Ok(v) = i16::try_from(value) {
        put_code(out, CODE_I16);
        out.extend_from_slice(&v.to_le_bytes());
    } else if let Ok(v) = i32::try_from(value) {
        put_code(out, CODE_I32);
        out.extend_from_slice(&v.to_le_bytes());
    } else {
        put_code(out, CODE_I64);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let end = self.pos.checked_add(n).ok_or(CodecError::Truncated)?;
        let slice = self.data.get(self.pos..end).ok_or(CodecError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(N)?);
        Ok(arr)
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        Ok(u32::from_le_bytes(self.take_array()?) as usize)
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        let len = self.read_len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    fn read_variant(&mut self, depth: usize) -> Result<Variant, CodecError> {
        if depth > VARIANT_MAX_DEPTH {
            return Err(CodecError::RecursionLimit(VARIANT_MAX_DEPTH));
        }
        let code = u16::from_le_bytes(self.take_array()?);
        Ok(match code {
            CODE_NULL => Variant::Null,
            CODE_U8 => unsigned(code, u8::from_le_bytes(self.take_array()?) as u64)?,
            CODE_U16 => unsigned(code, u16::from_le_bytes(self.take_array()?) as u64)?,
            CODE_U32 => unsigned(code, u32::from_le_bytes(self.take_array()?) as u64)?,
            CODE_U64 => unsigned(code, u64::from_le_bytes(self.take_array()?))?,
            CODE_I8 => signed(code, i8::from_le_bytes(self.take_array()?) as i64)?,
            CODE_I16 => signed(code, i16::from_le_bytes(self.take_array()?) as i64)?,
            CODE_I32 => signed(code, i32::from_le_bytes(self.take_array()?) as i64)?,
            CODE_I64 => signed(code, i64::from_le_bytes(self.take_array()?))?,
            CODE_BOOL => match self.take(1)?[0] {
                0 => Variant::Bool(false),
                1 => Variant::Bool(true),
                _ => return Err(CodecError::NonCanonical("bool byte")),
            },
            CODE_STRING => Variant::String(self.read_string()?),
            CODE_LIST => {
                let count = self.read_len()?;
                // Every element takes at least two bytes; don't trust `count`
                // for the allocation.
                let mut items = Vec::with_capacity(count.min(self.data.len() / 2));
                for _ in 0..count {
                    items.push(self.read_variant(depth + 1)?);
                }
                Variant::List(items)
            }
            CODE_OBJECT => {
                let count = self.read_len()?;
                let mut fields = BTreeMap::new();
                for _ in 0..count {
                    let key = self.read_string()?;
                    // Keys must arrive strictly ascending: no duplicates, no reordering.
                    if fields
                        .last_key_value()
                        .is_some_and(|(last, _)| *last >= key)
                    {
                        return Err(CodecError::NonCanonical("object keys out of order"));
                    }
                    let value = self.read_variant(depth + 1)?;
                    fields.insert(key, value);
                }
                Variant::Object(fields)
            }
            other => return Err(CodecError::UnknownTypeCode(other)),
        })
    }
}

fn unsigned_code(value: u64) -> u16 {
    if value <= u8::MAX as u64 {
        CODE_U8
    } else if value <= u16::MAX as u64 {
        CODE_U16
    } else if value <= u32::MAX as u64 {
        CODE_U32
    } else {
        CODE_U64
    }
}

fn signed_code(value: i64) -> u16 {
    if value >= i8::MIN as i64 {
        CODE_I8
    } else if value >= i16::MIN as i64 {
        CODE_I16
    } else if value >= i32::MIN as i64 {
        CODE_I32
    } else {
        CODE_I64
    }
}

/// An unsigned integer is only valid in its narrowest width.
fn unsigned(code: u16, value: u64) -> Result<Variant, CodecError> {
    if unsigned_code(value) != code {
        return Err(CodecError::NonCanonical("integer width"));
    }
    Ok(Variant::UInt(value))
}

/// Signed codes carry negative values only, in their narrowest width.
fn signed(code: u16, value: i64) -> Result<Variant, CodecError> {
    if value >= 0 {
        return Err(CodecError::NonCanonical("non-negative signed integer"));
    }
    if signed_code(value) != code {
        return Err(CodecError::NonCanonical("integer width"));
    }
    Ok(Variant::Int(value))
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}

impl From<u64> for Variant {
    fn from(value: u64) -> Self {
        Variant::UInt(value)
    }
}

impl From<u32> for Variant {
    fn from(value: u32) -> Self {
        Variant::UInt(value as u64)
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        if value >= 0 {
            Variant::UInt(value as u64)
        } else {
            Variant::Int(value)
        }
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant::String(value.to_string())
    }
}

impl From<String> for Variant {
    fn from(value: String) -> Self {
        Variant::String(value)
    }
}

impl From<Vec<Variant>> for Variant {
    fn from(value: Vec<Variant>) -> Self {
        Variant::List(value)
    }
}

impl From<BTreeMap<String, Variant>> for Variant {
    fn from(value: BTreeMap<String, Variant>) -> Self {
        Variant::Object(value)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for Variant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Variant::Null => serializer.serialize_unit(),
            Variant::Bool(b) => serializer.serialize_bool(*b),
            Variant::UInt(u) => serializer.serialize_u64(*u),
            Variant::Int(i) => serializer.serialize_i64(*i),
            Variant::String(s) => serializer.serialize_str(s),
            Variant::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Variant::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Variant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Variant::from_json(&value).map_err(D::Error::custom)
    }
}
