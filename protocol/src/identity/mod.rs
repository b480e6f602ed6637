//! # Identity Module
//!
//! Deterministic wallet keys. A wallet is a 32-byte [`Seed`] plus an
//! optional passphrase; everything else is derived:
//!
//! 1. **Signing keys** - one secp256k1 keypair per index, addresses are
//!    SHA-256 of the compressed public key.
//! 2. **Farmer key** - a separate keypair for pool/farming, passphrase-free.
//! 3. **Fingerprint** - a `u32` that tells wallets apart without revealing
//!    anything about the keys.
//! 4. **Mnemonic** - the seed as 24 BIP-39 words, for backups.
//!
//! ## Design Decisions
//!
//! - The derivation core ([`derivation`]) is synchronous and pure. The async
//!   layer ([`tasks`]) moves it to the blocking pool; callers always await.
//! - No caching here. Same inputs, same outputs; the vault caches.

pub mod derivation;
pub mod mnemonic;
pub mod tasks;

pub use derivation::{
    derive_farmer_key, derive_signing_key, fingerprint, step, stretch, AccountNode, Seed,
};
pub use mnemonic::{mnemonic_to_seed, seed_to_mnemonic, MNEMONIC_WORDS};
