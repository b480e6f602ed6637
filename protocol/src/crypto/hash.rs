//! # Hashing Utilities
//!
//! The two hash primitives the protocol is built on:
//!
//! - **SHA-256** - transaction ids, content hashes, addresses, fingerprints.
//! - **HMAC-SHA512** - the key-derivation tree (see [`crate::identity`]).
//!
//! Nothing else. If you need a new hash here, you need a new protocol version.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// Compute the SHA-256 hash of the input data as a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use mmx_protocol::crypto::sha256;
///
/// let hash = sha256(b"MMX");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// Compute the SHA-256 hash and return a fixed-size array.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 over several parts fed in sequence, without concatenating them
/// into a temporary buffer first.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// HMAC-SHA512 of `data` under `key`.
///
/// HMAC accepts keys of any length, so this cannot fail in practice; the
/// `Option` only mirrors the underlying constructor.
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> Option<[u8; 64]> {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(key).ok()?;
    mac.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Some(out)
}
