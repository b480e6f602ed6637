//! # Wallet Key Store
//!
//! A [`Wallet`] holds the signing keys derived from one seed and passphrase,
//! indexed both by derivation index and by address. The transaction builder
//! asks it two questions: "what is the primary address?" and "which key
//! signs for this address?".
//!
//! ## Primary Address
//!
//! Index 0. Synthesized inputs spend from it and it becomes the default
//! `sender`.
//!
//! ## Secrets
//!
//! The wallet keeps derived keypairs only. The seed is consumed at open
//! time and dropped (zeroized); the passphrase is never stored.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::cache::KeyCache;
use crate::crypto::{KeyError, KeyPair, PubKey};
use crate::identity::{self, tasks, Seed};
use crate::types::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A wallet needs at least the primary key.
    #[error("a wallet needs at least one address")]
    NoAddresses,
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Wallet {
    keys: Vec<Arc<KeyPair>>,
    by_address: HashMap<Address, usize>,
    fingerprint: u32,
    farmer_key: PubKey,
}

impl Wallet {
    /// Derives `num_addresses` signing keys, the farmer key and the
    /// fingerprint, all on the blocking pool.
    pub async fn open(seed: Seed, passphrase: &str, num_addresses: u32) -> Result<Self, WalletError> {
        let keys = tasks::derive_signing_keys(seed.clone(), passphrase.to_string(), 0..num_addresses)
            .await?
            .into_iter()
            .map(Arc::new)
            .collect();
        Self::assemble(seed, passphrase, keys).await
    }

    /// Like [`Wallet::open`], but reuses keys from `cache`.
    pub async fn open_cached(
        cache: &KeyCache,
        seed: Seed,
        passphrase: &str,
        num_addresses: u32,
    ) -> Result<Self, WalletError> {
        let keys = cache.signing_keys(&seed, passphrase, num_addresses).await?;
        Self::assemble(seed, passphrase, keys).await
    }

    async fn assemble(
        seed: Seed,
        passphrase: &str,
        keys: Vec<Arc<KeyPair>>,
    ) -> Result<Self, WalletError> {
        if keys.is_empty() {
            return Err(WalletError::NoAddresses);
        }
        let (fingerprint, farmer) = futures::try_join!(
            tasks::fingerprint(seed.clone(), passphrase.to_string()),
            tasks::derive_farmer_key(seed),
        )?;
        let wallet = Self::from_parts(keys, fingerprint, *farmer.public_key());
        info!(
            fingerprint = wallet.fingerprint,
            addresses = wallet.len(),
            primary = %wallet.primary_address(),
            "wallet opened"
        );
        Ok(wallet)
    }

    fn from_parts(keys: Vec<Arc<KeyPair>>, fingerprint: u32, farmer_key: PubKey) -> Self {
        let by_address = keys
            .iter()
            .enumerate()
            .map(|(i, key)| (key.address(), i))
            .collect();
        Self {
            keys,
            by_address,
            fingerprint,
            farmer_key,
        }
    }

    /// Synchronous variant for callers outside an async runtime.
    pub fn open_blocking(seed: &Seed, passphrase: &str, num_addresses: u32) -> Result<Self, WalletError> {
        if num_addresses == 0 {
            return Err(WalletError::NoAddresses);
        }
        let node = identity::AccountNode::new(seed, passphrase)?;
        let keys = (0..num_addresses)
            .map(|i| node.signing_key(i).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        let farmer = identity::derive_farmer_key(seed)?;
        let fingerprint = identity::fingerprint(seed, passphrase);
        Ok(Self::from_parts(keys, fingerprint, *farmer.public_key()))
    }

    /// Address at index 0.
    pub fn primary_address(&self) -> Address {
        self.keys[0].address()
    }

    pub fn address(&self, index: usize) -> Option<Address> {
        self.keys.get(index).map(|k| k.address())
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.keys.iter().map(|k| k.address()).collect()
    }

    /// The keypair that signs for `address`, if this wallet holds it.
    pub fn find_key(&self, address: &Address) -> Option<&KeyPair> {
        self.by_address.get(address).map(|&i| self.keys[i].as_ref())
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.by_address.contains_key(address)
    }

    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    pub fn farmer_public_key(&self) -> &PubKey {
        &self.farmer_key
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("fingerprint", &self.fingerprint)
            .field("addresses", &self.keys.len())
            .finish()
    }
}
