//! # Vault Module
//!
//! Where the wallet's keys live once they are derived.
//!
//! ```text
//! wallet.rs - Wallet: derived keypairs indexed by address
//! cache.rs  - KeyCache: derived keys shared across wallet opens
//! ```
//!
//! Nothing in here persists secrets. A wallet is rebuilt from its seed
//! every time it is opened, which is why the cache exists.

pub mod cache;
pub mod wallet;

pub use cache::KeyCache;
pub use wallet::{Wallet, WalletError};
