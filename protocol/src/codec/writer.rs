//! The canonical byte writer.
//!
//! Every kind of value is prefixed with a fixed ASCII tag naming its wire
//! type, so heterogeneous nested structures hash deterministically without a
//! schema:
//!
//! | value                              | bytes                                         |
//! |------------------------------------|-----------------------------------------------|
//! | `u8` / `u16` / `u32` / `u64`       | raw little-endian, no tag                     |
//! | `Uint128`                          | 16 raw bytes, lower limb then upper limb      |
//! | `bool`                             | one byte, 0 or 1                              |
//! | string                             | `string<>` + u64 length + UTF-8               |
//! | bytes, hash, address, key, sig     | `bytes<>` + u64 length + raw bytes            |
//! | vector                             | `vector<>` + u64 count + elements             |
//! | optional                           | `optional<>` + bool + value if present        |
//! | pair                               | `pair<>` + first + second                     |
//! | map                                | `map<>` + u64 count + pairs in key order      |
//! | Variant                            | `variant<>` + the Variant encoding verbatim   |
//! | field                              | `field<>` + name as string + value            |
//!
//! Hashed records start with a type discriminator: the first 8 bytes of
//! SHA-256 over the record's type name, as a little-endian `u64`.

use std::collections::BTreeMap;

use super::{CodecError, Variant};
use crate::crypto::hash::sha256_array;
use crate::crypto::{PubKey, Signature};
use crate::types::{Address, ByteString, Hash, Uint128};

pub const TAG_STRING: &str = "string<>";
pub const TAG_BYTES: &str = "bytes<>";
pub const TAG_VECTOR: &str = "vector<>";
pub const TAG_OPTIONAL: &str = "optional<>";
pub const TAG_PAIR: &str = "pair<>";
pub const TAG_MAP: &str = "map<>";
pub const TAG_VARIANT: &str = "variant<>";
pub const TAG_FIELD: &str = "field<>";

/// The 64-bit type discriminator for a record type name.
pub fn type_hash(name: &str) -> u64 {
    let digest = sha256_array(name.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

/// A value that knows its canonical encoding.
///
/// `full_hash` selects the content-hash form for records that have one;
/// everything else ignores it and just passes it down.
pub trait WriteBytes {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError>;
}

/// A growable buffer of canonical bytes.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Appends raw bytes, untagged.
    pub fn write(&mut self, raw: &[u8]) {
        self.buf.extend_from_slice(raw);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write(&value.to_le_bytes());
    }

    pub fn write_u128(&mut self, value: Uint128) {
        self.write_u64(value.lower());
        self.write_u64(value.upper());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// `string<>` + u64 byte length + UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) {
        self.write(TAG_STRING.as_bytes());
        self.write_len(value.len());
        self.write(value.as_bytes());
    }

    /// `bytes<>` + u64 length + raw bytes.
    pub fn write_byte_string(&mut self, value: &[u8]) {
        self.write(TAG_BYTES.as_bytes());
        self.write_len(value.len());
        self.write(value);
    }

    /// The 8-byte type discriminator for `name`.
    pub fn write_type(&mut self, name: &str) {
        self.write_u64(type_hash(name));
    }

    /// `field<>` + name + value.
    pub fn write_field<T: WriteBytes + ?Sized>(
        &mut self,
        name: &str,
        value: &T,
        full_hash: bool,
    ) -> Result<(), CodecError> {
        self.write(TAG_FIELD.as_bytes());
        self.write_string(name);
        value.write_bytes(self, full_hash)
    }

    /// Writes any encodable value through the dispatcher.
    pub fn write_value<T: WriteBytes + ?Sized>(
        &mut self,
        value: &T,
        full_hash: bool,
    ) -> Result<(), CodecError> {
        value.write_bytes(self, full_hash)
    }

    fn write_len(&mut self, len: usize) {
        self.write_u64(len as u64);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// SHA-256 over everything written so far.
    pub fn digest(&self) -> Hash {
        Hash::digest(&self.buf)
    }
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

macro_rules! impl_write_int {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl WriteBytes for $ty {
                fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
                    out.$method(*self);
                    Ok(())
                }
            }
        )*
    };
}

impl_write_int!(u8 => write_u8, u16 => write_u16, u32 => write_u32, u64 => write_u64);

impl WriteBytes for bool {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write_bool(*self);
        Ok(())
    }
}

impl WriteBytes for Uint128 {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write_u128(*self);
        Ok(())
    }
}

impl WriteBytes for str {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write_string(self);
        Ok(())
    }
}

impl WriteBytes for String {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write_string(self);
        Ok(())
    }
}

macro_rules! impl_write_opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl WriteBytes for $ty {
                fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
                    out.write_byte_string(self.as_ref());
                    Ok(())
                }
            }
        )*
    };
}

impl_write_opaque!(ByteString, Hash, Address);

impl WriteBytes for PubKey {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write_byte_string(self.as_bytes());
        Ok(())
    }
}

impl WriteBytes for Signature {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write_byte_string(self.as_bytes());
        Ok(())
    }
}

impl WriteBytes for Variant {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        let encoded = self.encode()?;
        out.write(TAG_VARIANT.as_bytes());
        out.write(&encoded);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: WriteBytes> WriteBytes for [T] {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        out.write(TAG_VECTOR.as_bytes());
        out.write_len(self.len());
        for item in self {
            item.write_bytes(out, full_hash)?;
        }
        Ok(())
    }
}

impl<T: WriteBytes> WriteBytes for Vec<T> {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        self.as_slice().write_bytes(out, full_hash)
    }
}

impl<T: WriteBytes> WriteBytes for Option<T> {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        out.write(TAG_OPTIONAL.as_bytes());
        out.write_bool(self.is_some());
        match self {
            Some(value) => value.write_bytes(out, full_hash),
            None => Ok(()),
        }
    }
}

impl<A: WriteBytes, B: WriteBytes> WriteBytes for (A, B) {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        out.write(TAG_PAIR.as_bytes());
        self.0.write_bytes(out, full_hash)?;
        self.1.write_bytes(out, full_hash)
    }
}

impl<K: WriteBytes + Ord, V: WriteBytes> WriteBytes for BTreeMap<K, V> {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        out.write(TAG_MAP.as_bytes());
        out.write_len(self.len());
        for (key, value) in self {
            key.write_bytes(out, full_hash)?;
            value.write_bytes(out, full_hash)?;
        }
        Ok(())
    }
}

impl<T: WriteBytes + ?Sized> WriteBytes for &T {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        (**self).write_bytes(out, full_hash)
    }
}
