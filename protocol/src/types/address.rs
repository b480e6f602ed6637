//! # MMX Addresses
//!
//! An address is 32 raw bytes, usually the SHA-256 of a compressed public
//! key or the id of a deployed contract. The text form is bech32m under the
//! `mmx` prefix, computed over the byte-reversed value:
//!
//! ```text
//! raw (32 bytes) -> reverse -> bech32m("mmx", reversed) -> mmx1...
//! ```
//!
//! Decoding undoes both steps. Only bech32m checksums are accepted; a
//! classic bech32 checksum over the same payload is rejected.

use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32m, Hrp};

use super::{impl_serde_via_str, Hash, TypeError};
use crate::config::{ADDRESS_PREFIX, HASH_LENGTH};
use crate::crypto::hash::sha256_array;

fn prefix() -> Hrp {
    Hrp::parse_unchecked(ADDRESS_PREFIX)
}

/// A 32-byte account or contract identifier.
///
/// ```
/// use mmx_protocol::types::Address;
///
/// let zero = Address::ZERO;
/// let text = zero.to_string();
/// assert_eq!(text.parse::<Address>().unwrap(), zero);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; HASH_LENGTH]);

impl Address {
    /// The zero address. Also the currency id of the native coin.
    pub const ZERO: Self = Self([0u8; HASH_LENGTH]);

    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(slice: &[u8]) -> Result<Self, TypeError> {
        let bytes: [u8; HASH_LENGTH] =
            slice.try_into().map_err(|_| TypeError::InvalidLength {
                expected: HASH_LENGTH,
                got: slice.len(),
            })?;
        Ok(Self(bytes))
    }

    /// Address of a public key: SHA-256 over its compressed encoding.
    pub fn from_public_key_bytes(pubkey: &[u8]) -> Self {
        Self(sha256_array(pubkey))
    }

    /// Raw bytes, in hashing order (not reversed).
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Returns `true` for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LENGTH]
    }

    /// The bech32m text form.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    fn reversed(&self) -> [u8; HASH_LENGTH] {
        let mut data = self.0;
        data.reverse();
        data
    }
}

impl From<Hash> for Address {
    fn from(hash: Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl From<Address> for Hash {
    fn from(addr: Address) -> Self {
        Hash::new(addr.0)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        bech32::encode_to_fmt::<Bech32m, _>(f, prefix(), &self.reversed()).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let checked = CheckedHrpstring::new::<Bech32m>(s)
            .map_err(|e| TypeError::Bech32(e.to_string()))?;

        let got = checked.hrp().to_lowercase();
        if got != ADDRESS_PREFIX {
            return Err(TypeError::InvalidPrefix {
                expected: ADDRESS_PREFIX.to_string(),
                got,
            });
        }

        let mut data: Vec<u8> = checked.byte_iter().collect();
        if data.len() != HASH_LENGTH {
            return Err(TypeError::InvalidLength {
                expected: HASH_LENGTH,
                got: data.len(),
            });
        }
        data.reverse();
        Self::from_slice(&data)
    }
}

impl_serde_via_str!(Address);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZERO_ADDRESS_TEXT;
    use bech32::Bech32;

    #[test]
    fn zero_address_has_well_known_text() {
        assert_eq!(Address::ZERO.to_string(), ZERO_ADDRESS_TEXT);
    }

    #[test]
    fn zero_address_round_trip() {
        let parsed: Address = Address::ZERO.to_text().parse().unwrap();
        assert_eq!(parsed, Address::ZERO);
        assert!(parsed.is_zero());
    }

    #[test]
    fn text_encodes_reversed_bytes() {
        let mut raw = [0u8; 32];
        raw[0] = 0xFF;
        let addr = Address::new(raw);

        let encoded = addr.to_string();
        let checked = CheckedHrpstring::new::<Bech32m>(&encoded).unwrap();
        let payload: Vec<u8> = checked.byte_iter().collect();
        assert_eq!(payload[31], 0xFF);
        assert_eq!(payload[0], 0x00);

        assert_eq!(addr.to_string().parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn foreign_prefix_is_rejected() {
        let hrp = Hrp::parse("xch").unwrap();
        let text = bech32::encode::<Bech32m>(hrp, &[7u8; 32]).unwrap();
        let err = text.parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidPrefix {
                expected: "mmx".to_string(),
                got: "xch".to_string(),
            }
        );
    }

    #[test]
    fn classic_bech32_checksum_is_rejected() {
        let text = bech32::encode::<Bech32>(prefix(), &[7u8; 32]).unwrap();
        assert!(matches!(text.parse::<Address>(), Err(TypeError::Bech32(_))));
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        let text = bech32::encode::<Bech32m>(prefix(), &[7u8; 20]).unwrap();
        assert_eq!(
            text.parse::<Address>().unwrap_err(),
            TypeError::InvalidLength { expected: 32, got: 20 }
        );
        assert!(Address::from_slice(&[1u8; 33]).is_err());
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut text = Address::new([9u8; 32]).to_string();
        let last = text.pop().unwrap();
        text.push(if last == 'q' { 'p' } else { 'q' });
        assert!(text.parse::<Address>().is_err());
    }

    #[test]
    fn address_json_is_bech32m() {
        let addr = Address::new([3u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert!(json.starts_with("\"mmx1"));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn hash_conversion_keeps_bytes() {
        let h = Hash::digest(b"contract");
        let addr = Address::from(h);
        assert_eq!(addr.as_bytes(), h.as_bytes());
        assert_eq!(Hash::from(addr), h);
    }
}
