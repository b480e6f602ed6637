//! # Protocol Constants
//!
//! Every contractual constant of the wallet engine lives here. Most of these
//! are not tunables: an independent consensus implementation recomputes the
//! same hashes and derives the same keys, so changing any of them produces
//! transactions the network will reject, or worse, keys nobody can recover.
//!
//! Runtime knobs (fees, cost limits, decimals) are per-network and live in
//! [`crate::params::ChainParams`] instead.

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Bech32m human-readable prefix for every MMX address.
pub const ADDRESS_PREFIX: &str = "mmx";

/// Text form of the all-zero address. The zero address doubles as the
/// currency id of the native coin.
pub const ZERO_ADDRESS_TEXT: &str =
    "mmx1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqdgytev";

/// Length of hashes and addresses in bytes.
pub const HASH_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Domain string prefixed to the passphrase when stretching the seed for
/// signing keys.
pub const SEED_DOMAIN: &str = "MMX/seed/";

/// Domain string for the farmer (pool) key chain.
pub const FARMER_DOMAIN: &str = "MMX/farmer_keys";

/// Domain string prefixed to the passphrase for fingerprints.
pub const FINGERPRINT_DOMAIN: &str = "MMX/fingerprint/";

/// HMAC-SHA512 iterations used to stretch a seed into a master key.
pub const SEED_STRETCH_ROUNDS: u32 = 4096;

/// Chain index of the signing key tree.
pub const SIGNING_CHAIN_INDEX: u32 = 11337;

/// Account index below the signing chain.
pub const SIGNING_ACCOUNT_INDEX: u32 = 0;

/// SHA-256 iterations for the wallet fingerprint.
pub const FINGERPRINT_ROUNDS: u32 = 16384;

/// Length of a wallet seed in bytes.
pub const SEED_LENGTH: usize = 32;

/// Length of a secp256k1 secret key.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Length of a compressed secp256k1 public key.
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Length of a compact (r ‖ s) ECDSA signature.
pub const SIGNATURE_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Current transaction format version.
pub const TRANSACTION_VERSION: u32 = 0;

/// Maximum memo length in bytes. Longer memos are rejected outright.
pub const MAX_MEMO_LENGTH: usize = 64;

/// Memos are charged per started chunk of this many bytes.
pub const MEMO_CHUNK_SIZE: usize = 32;

/// Fee ratios are expressed in 1024ths: 1024 means "1.0x the minimum".
pub const FEE_RATIO_BASE: u32 = 1024;

/// Default gas budget reserved for contract execution when the caller does
/// not supply one.
pub const DEFAULT_GAS_LIMIT: u64 = 5_000_000;

/// Solution index meaning "this input is not signed by any solution".
pub const NO_SOLUTION: u16 = u16::MAX;

// ---------------------------------------------------------------------------
// Variant codec
// ---------------------------------------------------------------------------

/// Maximum nesting depth of a dynamic value. Contract call arguments are
/// attacker-controlled, so the codec refuses deeper values instead of
/// recursing without bound.
pub const VARIANT_MAX_DEPTH: usize = 100;
