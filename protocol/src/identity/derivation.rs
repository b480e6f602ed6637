//! Hierarchical key derivation.
//!
//! Everything is repeated HMAC-SHA512. Two primitives:
//!
//! - `stretch(message, key, n)`: `tmp = key`, then `n` times
//!   `tmp = HMAC(key = tmp, data = message)`.
//! - `step(message, key, index)`: one `HMAC(key, message ‖ BE32(index))`.
//!
//! Both return 64 bytes, used as two 32-byte halves (`first`, `second`).
//!
//! ```text
//! master  = stretch(seed, SHA256("MMX/seed/" + passphrase), 4096)
//! chain   = step(master.first,  master.second,  11337)
//! account = step(chain.first,   chain.second,   0)
//! leaf    = step(account.first, account.second, index)    -> secret = leaf.first
//! ```
//!
//! The farmer key uses its own domain (`MMX/farmer_keys`, no passphrase) and
//! a single step at index 0. The fingerprint is an iterated SHA-256, not
//! HMAC. Every constant here is contractual; see [`crate::config`].

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{
    FARMER_DOMAIN, FINGERPRINT_DOMAIN, FINGERPRINT_ROUNDS, SEED_DOMAIN, SEED_LENGTH,
    SEED_STRETCH_ROUNDS, SIGNING_ACCOUNT_INDEX, SIGNING_CHAIN_INDEX,
};
use crate::crypto::hash::{hmac_sha512, sha256_array, sha256_multi};
use crate::crypto::{KeyError, KeyPair, SecretKey};

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// 32 bytes of wallet entropy. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LENGTH]);

impl Seed {
    pub fn new(bytes: [u8; SEED_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Fresh random seed from the OS RNG.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; SEED_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SEED_LENGTH] = slice.try_into().map_err(|_| {
            KeyError::Derivation(format!(
                "seed must be {SEED_LENGTH} bytes, got {}",
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Parses a 64-character hex seed.
    pub fn from_hex(text: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| KeyError::Derivation(format!("seed is not hex: {e}")))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// A 64-byte HMAC output viewed as two halves.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Halves([u8; 64]);

impl Halves {
    pub fn first(&self) -> &[u8] {
        &self.0[..32]
    }

    pub fn second(&self) -> &[u8] {
        &self.0[32..]
    }

    fn first_array(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.first());
        out
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Result<[u8; 64], KeyError> {
    hmac_sha512(key, data).ok_or_else(|| KeyError::Derivation("hmac rejected key".into()))
}

/// `n` rounds of `tmp = HMAC(key = tmp, data = message)`, starting from `key`.
pub fn stretch(message: &[u8], key: &[u8], rounds: u32) -> Result<Halves, KeyError> {
    let mut tmp = key.to_vec();
    for _ in 0..rounds {
        let next = hmac(&tmp, message)?;
        tmp.zeroize();
        tmp = next.to_vec();
    }
    let mut out = [0u8; 64];
    if tmp.len() != out.len() {
        // Only reachable with zero rounds and a key that is not 64 bytes.
        return Err(KeyError::Derivation("stretch needs at least one round".into()));
    }
    out.copy_from_slice(&tmp);
    tmp.zeroize();
    Ok(Halves(out))
}

/// One `HMAC(key, message ‖ BE32(index))`.
pub fn step(message: &[u8], key: &[u8], index: u32) -> Result<Halves, KeyError> {
    let mut data = Vec::with_capacity(message.len() + 4);
    data.extend_from_slice(message);
    data.extend_from_slice(&index.to_be_bytes());
    let out = hmac(key, &data)?;
    data.zeroize();
    Ok(Halves(out))
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// The account node shared by every signing key of a wallet.
///
/// Deriving it costs 4096 HMAC rounds, deriving a leaf from it costs one.
/// Hold on to it when deriving many indices.
#[derive(Clone)]
pub struct AccountNode(Halves);

impl AccountNode {
    pub fn new(seed: &Seed, passphrase: &str) -> Result<Self, KeyError> {
        let domain = sha256_array(format!("{SEED_DOMAIN}{passphrase}").as_bytes());
        let master = stretch(seed.as_bytes(), &domain, SEED_STRETCH_ROUNDS)?;
        let chain = step(master.first(), master.second(), SIGNING_CHAIN_INDEX)?;
        let account = step(chain.first(), chain.second(), SIGNING_ACCOUNT_INDEX)?;
        Ok(Self(account))
    }

    /// The signing keypair at `index`.
    pub fn signing_key(&self, index: u32) -> Result<KeyPair, KeyError> {
        let leaf = step(self.0.first(), self.0.second(), index)?;
        KeyPair::from_secret(SecretKey::from_bytes(leaf.first_array())?)
    }
}

/// The signing keypair at `index` for `(seed, passphrase)`.
pub fn derive_signing_key(seed: &Seed, passphrase: &str, index: u32) -> Result<KeyPair, KeyError> {
    AccountNode::new(seed, passphrase)?.signing_key(index)
}

/// The farmer (pool) keypair. Independent of any passphrase.
pub fn derive_farmer_key(seed: &Seed) -> Result<KeyPair, KeyError> {
    let domain = sha256_array(FARMER_DOMAIN.as_bytes());
    let master = stretch(seed.as_bytes(), &domain, SEED_STRETCH_ROUNDS)?;
    let key = step(master.first(), master.second(), 0)?;
    KeyPair::from_secret(SecretKey::from_bytes(key.first_array())?)
}

/// Wallet fingerprint: distinguishes wallets without revealing key material.
pub fn fingerprint(seed: &Seed, passphrase: &str) -> u32 {
    let pass_hash = if passphrase.is_empty() {
        [0u8; 32]
    } else {
        sha256_array(format!("{FINGERPRINT_DOMAIN}{passphrase}").as_bytes())
    };
    let mut h = [0u8; 32];
    for _ in 0..FINGERPRINT_ROUNDS {
        h = sha256_multi(&[&h, seed.as_bytes(), &pass_hash]);
    }
    u32::from_le_bytes([h[0], h[1], h[2], h[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;
    use hex_literal::hex;

    fn zero_seed() -> Seed {
        Seed::new([0u8; 32])
    }

    fn addr(text: &str) -> Address {
        text.parse().unwrap()
    }

    #[test]
    fn zero_seed_fingerprint() {
        assert_eq!(fingerprint(&zero_seed(), ""), 2436358797);
        assert_eq!(fingerprint(&zero_seed(), "test"), 1073751830);
    }

    #[test]
    fn zero_seed_signing_keys() {
        let node = AccountNode::new(&zero_seed(), "").unwrap();

        let k0 = node.signing_key(0).unwrap();
        assert_eq!(
            k0.secret().as_bytes(),
            &hex!("7dd6f5df363f4be45292ee8eada758ca125da7afd39d44b10fff70a305d4716c")
        );
        assert_eq!(
            k0.public_key().as_bytes(),
            &hex!("027441519b528d79bf83aecf739b3dfb9f9828d3e4601bdf22ddf2b309b58c29c3")
        );
        assert_eq!(
            k0.address(),
            addr("mmx1sl54522p3g8gefrhym8uyrqjjl37jt8lj9hmd3gk7jwpngv9m4tqe33jaq")
        );

        let k1 = node.signing_key(1).unwrap();
        assert_eq!(
            k1.secret().as_bytes(),
            &hex!("63d28af31015dcbc585d48668066e0c3daf1fbb8ecea650cbd76b53d96f21c92")
        );
        assert_eq!(
            k1.public_key().as_bytes(),
            &hex!("026cce7475887d6330159d9f50a93835afc223fcfe01102137caaf6d3e9f0db08c")
        );
        assert_eq!(
            k1.address(),
            addr("mmx1tumqzdq74uafxurhvmuewzd2vxuuraqjmvdcyvxctyxxpdhjpj8strvg3l")
        );
    }

    #[test]
    fn passphrase_changes_keys() {
        let k0 = derive_signing_key(&zero_seed(), "test", 0).unwrap();
        assert_eq!(
            k0.secret().as_bytes(),
            &hex!("91f7af5419b4a40e6e408ef82e6d966bf6bbea606f5851d657c926f78873e0a1")
        );
        assert_eq!(
            k0.public_key().as_bytes(),
            &hex!("0263de3df1edc07dda2a36d355df1a4ca4a8b7a5d8ebd325f71dfde29369360325")
        );
        assert_eq!(
            k0.address(),
            addr("mmx1sxhydtmy8afx609d43ywza7ccqn7n5e89vjwrhcw70eyrqj246qsuyxz9c")
        );

        let k1 = derive_signing_key(&zero_seed(), "test", 1).unwrap();
        assert_eq!(
            k1.address(),
            addr("mmx159eq0agej9we7ldwnzfpklhgkmdz37kxzs23z95zqh0ru5lngkvsmrlsqy")
        );
    }

    #[test]
    fn zero_seed_farmer_key() {
        let farmer = derive_farmer_key(&zero_seed()).unwrap();
        assert_eq!(
            farmer.secret().as_bytes(),
            &hex!("2916527f456ec83f9ca505632dc09223d979116d44e35cafb474dcd599cc2745")
        );
        assert_eq!(
            farmer.public_key().as_bytes(),
            &hex!("02ef0f71e6a4be9c2d5ab1209be05d3393708550134c6a3cd613eaeca9cf87fce0")
        );
    }

    #[test]
    fn step_appends_big_endian_index() {
        let a = step(b"msg", b"key", 1).unwrap();
        let direct = hmac_sha512(b"key", b"msg\x00\x00\x00\x01").unwrap();
        assert_eq!(a.first(), &direct[..32]);
        assert_eq!(a.second(), &direct[32..]);
    }

    #[test]
    fn stretch_iterates_from_key() {
        let once = stretch(b"m", b"k", 1).unwrap();
        let direct = hmac_sha512(b"k", b"m").unwrap();
        assert_eq!(once.first(), &direct[..32]);

        let twice = stretch(b"m", b"k", 2).unwrap();
        let direct2 = hmac_sha512(&direct, b"m").unwrap();
        assert_eq!(twice.second(), &direct2[32..]);
    }

    #[test]
    fn seed_parsing() {
        assert!(Seed::from_hex(&"00".repeat(32)).is_ok());
        assert!(Seed::from_hex("abcd").is_err());
        assert!(Seed::from_hex("zz").is_err());
        assert_eq!(format!("{:?}", zero_seed()), "Seed(<redacted>)");
    }
}
