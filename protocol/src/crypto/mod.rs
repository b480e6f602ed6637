//! # Cryptographic Primitives for MMX
//!
//! Every key, hash and signature in the wallet flows through here.
//!
//! - **SHA-256** for ids, addresses and fingerprints.
//! - **HMAC-SHA512** for the key-derivation tree.
//! - **secp256k1 ECDSA** (compact, low-S) for transaction signatures.
//!
//! All of it is thin, typed wrapping around audited crates (`sha2`, `hmac`,
//! `k256`). If you are tempted to optimize these functions, don't.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{hmac_sha512, sha256, sha256_array};
pub use keys::{KeyError, KeyPair, PubKey, SecretKey, Signature};
pub use signatures::{sign, verify, LocalSigner, SignatureError, SigningProvider};
