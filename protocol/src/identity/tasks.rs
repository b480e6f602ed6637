//! Async entry points for key derivation.
//!
//! Derivation is thousands of HMAC rounds; it runs on tokio's blocking pool
//! so it never stalls the executor. Each request is independent and owns
//! its inputs. Caching is the caller's business (see
//! [`crate::vault::KeyCache`]).

use std::ops::Range;

use tokio::task::spawn_blocking;
use tracing::debug;

use super::derivation::{self, AccountNode, Seed};
use crate::crypto::{KeyError, KeyPair};

fn join_error(err: tokio::task::JoinError) -> KeyError {
    KeyError::TaskFailed(err.to_string())
}

/// Derives the signing keypair at `index`.
pub async fn derive_signing_key(
    seed: Seed,
    passphrase: String,
    index: u32,
) -> Result<KeyPair, KeyError> {
    spawn_blocking(move || derivation::derive_signing_key(&seed, &passphrase, index))
        .await
        .map_err(join_error)?
}

/// Derives a contiguous range of signing keypairs, sharing the account node.
pub async fn derive_signing_keys(
    seed: Seed,
    passphrase: String,
    indices: Range<u32>,
) -> Result<Vec<KeyPair>, KeyError> {
    debug!(start = indices.start, end = indices.end, "deriving signing keys");
    spawn_blocking(move || -> Result<Vec<KeyPair>, KeyError> {
        let node = AccountNode::new(&seed, &passphrase)?;
        indices.map(|index| node.signing_key(index)).collect()
    })
    .await
    .map_err(join_error)?
}

/// Derives the farmer keypair.
pub async fn derive_farmer_key(seed: Seed) -> Result<KeyPair, KeyError> {
    spawn_blocking(move || derivation::derive_farmer_key(&seed))
        .await
        .map_err(join_error)?
}

/// Computes the wallet fingerprint.
pub async fn fingerprint(seed: Seed, passphrase: String) -> Result<u32, KeyError> {
    spawn_blocking(move || derivation::fingerprint(&seed, &passphrase))
        .await
        .map_err(join_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn async_matches_sync() {
        let seed = Seed::new([7u8; 32]);
        let a = derive_signing_key(seed.clone(), String::new(), 3).await.unwrap();
        let b = derivation::derive_signing_key(&seed, "", 3).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn range_matches_individual_derivations() {
        let seed = Seed::new([0u8; 32]);
        let keys = derive_signing_keys(seed.clone(), "pw".into(), 0..3).await.unwrap();
        assert_eq!(keys.len(), 3);
        for (i, key) in keys.iter().enumerate() {
            let single = derive_signing_key(seed.clone(), "pw".into(), i as u32).await.unwrap();
            assert_eq!(*key, single);
        }
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let seed = Seed::new([0u8; 32]);
        let (with, without) = tokio::join!(
            fingerprint(seed.clone(), "test".into()),
            fingerprint(seed.clone(), String::new()),
        );
        assert_eq!(without.unwrap(), 2436358797);
        assert_eq!(with.unwrap(), 1073751830);
    }
}
