//! Byte strings and SHA-256 hashes.

use std::fmt;
use std::str::FromStr;

use super::{impl_serde_via_str, TypeError};
use crate::config::HASH_LENGTH;
use crate::crypto::hash::sha256_array;

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte SHA-256 digest.
///
/// The default value is 32 zero bytes, which the transaction model uses as
/// the placeholder for "absent" sub-records (no deploy payload, no execution
/// result).
///
/// ```
/// use mmx_protocol::types::Hash;
///
/// let h = Hash::digest(b"");
/// assert_eq!(
///     h.to_string(),
///     "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
/// );
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// The all-zero hash.
    pub const ZERO: Self = Self([0u8; HASH_LENGTH]);

    /// Wraps raw digest bytes.
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// SHA-256 of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(sha256_array(data))
    }

    /// Builds a hash from a slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypeError> {
        let bytes: [u8; HASH_LENGTH] =
            slice.try_into().map_err(|_| TypeError::InvalidLength {
                expected: HASH_LENGTH,
                got: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Returns `true` for the all-zero placeholder.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LENGTH]
    }

    /// Upper-case hex, the display form used by the node.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LENGTH]> for Hash {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = TypeError;

    /// Parses 64 hex characters, either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl_serde_via_str!(Hash);

// ---------------------------------------------------------------------------
// ByteString
// ---------------------------------------------------------------------------

/// An immutable, variable-length byte sequence with a hex text form.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteString(Vec<u8>);

impl ByteString {
    /// Wraps owned bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrowed view of the bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the wrapper.
    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(&self.0))
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteString({})", hex::encode(&self.0))
    }
}

impl FromStr for ByteString {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidHex(e.to_string()))
    }
}

impl_serde_via_str!(ByteString);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_hash_is_zero() {
        assert_eq!(Hash::default(), Hash::ZERO);
        assert!(Hash::ZERO.is_zero());
        assert!(!Hash::digest(b"mmx").is_zero());
    }

    #[test]
    fn digest_matches_known_vector() {
        let h = Hash::digest(b"abc");
        assert_eq!(
            h.to_hex(),
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[test]
    fn hash_parses_either_case() {
        let h = Hash::digest(b"abc");
        let lower: Hash = h.to_hex().to_lowercase().parse().unwrap();
        let upper: Hash = h.to_hex().parse().unwrap();
        assert_eq!(lower, h);
        assert_eq!(upper, h);
    }

    #[test]
    fn hash_rejects_wrong_length() {
        let err = "ABCD".parse::<Hash>().unwrap_err();
        assert_eq!(err, TypeError::InvalidLength { expected: 32, got: 2 });
        assert!(Hash::from_slice(&[0u8; 31]).is_err());
    }

    #[test]
    fn hash_json_is_hex_string() {
        let h = Hash::digest(b"json");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn byte_string_hex_round_trip() {
        let b = ByteString::new(vec![0x02, 0xAB, 0xFF]);
        assert_eq!(b.to_string(), "02ABFF");
        assert_eq!("02abff".parse::<ByteString>().unwrap(), b);
        assert_eq!(b.len(), 3);
        assert!(ByteString::default().is_empty());
    }

    #[test]
    fn byte_string_rejects_odd_hex() {
        assert!(matches!(
            "abc".parse::<ByteString>(),
            Err(TypeError::InvalidHex(_))
        ));
    }
}
