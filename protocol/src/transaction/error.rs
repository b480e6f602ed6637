//! Errors for the transaction model, cost model, builder and verifier.
//!
//! Each variant maps to one rule. Messages carry enough context to debug a
//! rejected transaction without dumping it.

use thiserror::Error;

use crate::codec::CodecError;
use crate::crypto::{KeyError, SignatureError};
use crate::types::{Address, Hash, Uint128};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// A memo exceeds the byte limit.
    #[error("memo too long: {len} bytes (max {max})")]
    MemoTooLong { len: usize, max: usize },

    /// A 64-bit or 128-bit bound was exceeded while summing amounts or cost.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    /// Encoding a record failed (usually a Variant nested too deep).
    #[error("encoding failed: {0}")]
    Codec(#[from] CodecError),

    /// A required build option is missing or inconsistent.
    #[error("invalid build options: {0}")]
    Configuration(String),

    /// The stored `id` does not match the recomputed one.
    #[error("transaction id mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: Hash, actual: Hash },

    /// The stored `content_hash` does not match the recomputed one.
    #[error("content hash mismatch: expected {expected}, got {actual}")]
    ContentHashMismatch { expected: Hash, actual: Hash },

    /// Nonce zero is reserved for "unset".
    #[error("nonce must be non-zero")]
    ZeroNonce,

    #[error("network name is empty")]
    MissingNetwork,

    /// An input or operation points past the end of `solutions`.
    #[error("solution index {index} out of range ({count} solutions)")]
    SolutionIndex { index: u16, count: usize },

    /// The referenced solution was made by a key that does not own the
    /// input or operation pointing at it.
    #[error("solution {index} belongs to {actual}, expected owner {expected}")]
    SolutionOwner {
        index: u16,
        expected: Address,
        actual: Address,
    },

    /// A solution's signature does not verify over `id`.
    #[error("solution {index} has an invalid signature")]
    InvalidSignature { index: usize },

    /// More solutions than a `u16` index can address.
    #[error("too many solutions")]
    TooManySolutions,

    #[error("static cost mismatch: expected {expected}, got {actual}")]
    CostMismatch { expected: u64, actual: u64 },

    #[error("fee ratio {ratio} below minimum {min}")]
    FeeRatioTooLow { ratio: u32, min: u32 },

    #[error("static cost {cost} exceeds maximum {max}")]
    CostTooHigh { cost: u64, max: u64 },

    /// The wallet holds no key for an owner that must sign.
    #[error("no key available for owner {0}")]
    UnknownOwner(Address),

    #[error("insufficient funds in {currency}: need {required}, have {available}")]
    InsufficientFunds {
        currency: Address,
        required: Uint128,
        available: Uint128,
    },

    #[error("signing failed: {0}")]
    Signing(#[from] SignatureError),

    #[error(transparent)]
    Key(#[from] KeyError),

    /// The JSON or transport document could not be read back.
    #[error("malformed transaction document: {0}")]
    Document(String),
}

impl From<serde_json::Error> for TransactionError {
    fn from(err: serde_json::Error) -> Self {
        TransactionError::Document(err.to_string())
    }
}

impl TransactionError {
    /// Whether this is an arithmetic bound violation.
    pub fn is_overflow(&self) -> bool {
        matches!(self, TransactionError::Overflow(_))
    }

    /// Whether this was raised while validating build options.
    pub fn is_configuration(&self) -> bool {
        matches!(self, TransactionError::Configuration(_))
    }
}
