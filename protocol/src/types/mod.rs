//! # Identifier Primitives
//!
//! Fixed-width identifiers and the 128-bit amount type. Everything the
//! canonical encoder writes as an opaque byte string goes through one of
//! these types:
//!
//! - [`Hash`] - 32 bytes, produced by a single SHA-256.
//! - [`Address`] - 32 bytes, bech32m text form over the byte-reversed value.
//! - [`ByteString`] - variable-length bytes (public keys, signatures, blobs).
//! - [`Uint128`] - amounts, two 64-bit limbs.

use thiserror::Error;

/// Implements `Serialize`/`Deserialize` through the type's `Display` and
/// `FromStr` impls, which is how every identifier appears in JSON.
macro_rules! impl_serde_via_str {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_serde_via_str;

pub mod address;
pub mod bytes;
pub mod uint128;

pub use address::Address;
pub use bytes::{ByteString, Hash};
pub use uint128::Uint128;

/// Errors raised while constructing identifiers or amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The input was not valid hexadecimal.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// The decoded value has the wrong number of bytes.
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// The bech32m string failed to decode (bad charset, bad checksum, ...).
    #[error("bech32m decode error: {0}")]
    Bech32(String),

    /// The address was encoded for another network prefix.
    #[error("invalid address prefix: expected '{expected}', got '{got}'")]
    InvalidPrefix {
        /// The prefix this wallet accepts.
        expected: String,
        /// The prefix found in the text.
        got: String,
    },

    /// The text is not an integer literal.
    #[error("invalid integer literal: {0}")]
    InvalidInteger(String),

    /// The integer does not fit in 128 unsigned bits.
    #[error("integer out of range for uint128: {0}")]
    OutOfRange(String),
}

impl TypeError {
    /// Returns `true` if this error is a numeric bound violation rather than
    /// malformed input.
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::OutOfRange(_))
    }
}
