//! # Canonical Encoding
//!
//! Hashes are only useful if two implementations agree on the bytes being
//! hashed. This module owns those bytes.
//!
//! - [`writer`] - the self-tagging canonical encoder every hashed record
//!   funnels through ([`ByteWriter`] + the [`WriteBytes`] trait).
//! - [`variant`] - the dynamic value codec used for contract-call
//!   arguments and metadata.
//! - [`transport`] - the compressed, URL-safe text form of a JSON document,
//!   for QR codes and links.
//!
//! Everything here is synchronous and pure. No shared state, no locks.

pub mod transport;
pub mod variant;
pub mod writer;

use thiserror::Error;

pub use transport::{compress_json, decompress_json, DICTIONARY_VERSION};
pub use variant::Variant;
pub use writer::{type_hash, ByteWriter, WriteBytes};

/// Errors raised while encoding, decoding or packing values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("value nesting exceeds the depth limit of {0}")]
    RecursionLimit(usize),

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("unexpected end of input")]
    Truncated,

    #[error("unknown variant type code {0}")]
    UnknownTypeCode(u16),

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("length {0} does not fit the wire format")]
    LengthOverflow(usize),

    #[error("transport compression failed: {0}")]
    Compression(String),

    #[error("transport text is not valid base64url: {0}")]
    Base64(String),

    #[error("decompressed payload exceeds {0} bytes")]
    TooLarge(usize),

    #[error("invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Json(err.to_string())
    }
}
