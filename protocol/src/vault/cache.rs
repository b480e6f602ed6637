//! # Derived-Key Cache
//!
//! Deriving a signing key costs ~4100 HMAC rounds. Wallet UIs open the same
//! wallet over and over, so derived keypairs are cached per
//! `(seed, passphrase, index)`.
//!
//! The cache never stores seeds or passphrases. Entries are keyed by a
//! SHA-256 over both, which identifies the wallet without being reversible.
//!
//! The lock is a `parking_lot::Mutex` held only for map lookups and
//! inserts; derivation itself happens outside the lock, on the blocking pool.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::crypto::hash::sha256_multi;
use crate::crypto::{KeyError, KeyPair};
use crate::identity::{tasks, Seed};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct WalletTag([u8; 32]);

impl WalletTag {
    fn new(seed: &Seed, passphrase: &str) -> Self {
        Self(sha256_multi(&[
            b"MMX/key-cache/",
            seed.as_bytes(),
            passphrase.as_bytes(),
        ]))
    }
}

/// Shared cache of derived signing keys.
#[derive(Default)]
pub struct KeyCache {
    entries: Mutex<HashMap<(WalletTag, u32), Arc<KeyPair>>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys `0..count` for the wallet, deriving only the missing ones.
    pub async fn signing_keys(
        &self,
        seed: &Seed,
        passphrase: &str,
        count: u32,
    ) -> Result<Vec<Arc<KeyPair>>, KeyError> {
        let tag = WalletTag::new(seed, passphrase);

        let cached: Vec<Option<Arc<KeyPair>>> = {
            let entries = self.entries.lock();
            (0..count).map(|i| entries.get(&(tag, i)).cloned()).collect()
        };
        let Some(first_missing) = cached.iter().position(Option::is_none) else {
            debug!(count, "key cache hit");
            return Ok(cached.into_iter().flatten().collect());
        };

        let first_missing = first_missing as u32;
        debug!(from = first_missing, to = count, "key cache miss, deriving");
        let derived =
            tasks::derive_signing_keys(seed.clone(), passphrase.to_string(), first_missing..count)
                .await?;

        let mut entries = self.entries.lock();
        for (offset, key) in derived.into_iter().enumerate() {
            entries.insert((tag, first_missing + offset as u32), Arc::new(key));
        }
        (0..count)
            .map(|i| {
                entries
                    .get(&(tag, i))
                    .cloned()
                    .ok_or_else(|| KeyError::Derivation(format!("key {i} missing from cache")))
            })
            .collect()
    }

    /// Forgets every key of one wallet.
    pub fn evict(&self, seed: &Seed, passphrase: &str) {
        let tag = WalletTag::new(seed, passphrase);
        self.entries.lock().retain(|(t, _), _| *t != tag);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCache").field("entries", &self.len()).finish()
    }
}
