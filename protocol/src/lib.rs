// Copyright (c) 2026 MMX Wallet Developers. MIT License.
// See LICENSE for details.

//! # MMX Wallet Engine - Core Library
//!
//! Builds, canonically encodes, hashes and signs MMX transactions so that a
//! node computes exactly the same bytes and the same hashes. Every typed
//! value, optional field, variant and nested structure serializes to one
//! byte sequence, and nothing else.
//!
//! ## Architecture
//!
//! Modules, leaf to root:
//!
//! - **config** - Contractual constants: address prefix, derivation domains,
//!   iteration counts, memo limits.
//! - **types** - `Hash`, `Address` (bech32m), `ByteString`, `Uint128`.
//! - **codec** - The canonical encoder, the Variant codec, and the
//!   compressed transport form.
//! - **crypto** - SHA-256 and HMAC-SHA512, secp256k1 keys, the async
//!   signing provider.
//! - **identity** - Seed to keys: signing keys, farmer key, fingerprint,
//!   mnemonic.
//! - **params** - Per-network fee constants and their cache.
//! - **vault** - The wallet's derived keys, indexed by address.
//! - **transaction** - The data model, two-mode hashing, cost model,
//!   signing, completion and verification.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mmx_protocol::identity::Seed;
//! use mmx_protocol::params::ChainParams;
//! use mmx_protocol::transaction::{Completer, Transaction, TxNote, TxOptions};
//! use mmx_protocol::types::{Address, Uint128};
//! use mmx_protocol::vault::Wallet;
//!
//! # async fn run() -> mmx_protocol::Result<()> {
//! let wallet = Wallet::open(Seed::generate(), "", 1).await?;
//! let params = ChainParams::mainnet();
//!
//! let mut draft = Transaction::new(TxNote::Transfer);
//! let to: Address = "mmx1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqdgytev".parse()?;
//! draft.add_output(Address::ZERO, to, Uint128::from(1_000_000u64));
//!
//! let options = TxOptions::builder().network("mainnet").expires(1_000_000).build()?;
//! let done = Completer::new(&wallet, &params).complete(draft, &options).await?;
//! println!("{} (fee {})", done.transaction.id, done.fee_value);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Determinism over convenience. Hashing never mutates a record.
//! 2. Checked arithmetic on every amount and cost.
//! 3. CPU-heavy work (derivation, signing) behind `async fn` on the
//!    blocking pool.
//! 4. No global state. Caches are values the caller owns.

pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod params;
pub mod transaction;
pub mod types;
pub mod vault;

pub use error::{Error, ErrorKind, Result};
