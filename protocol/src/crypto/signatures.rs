//! # Signing Provider
//!
//! Every signature in a transaction is an ECDSA signature over the
//! transaction `id`. Signing is CPU-bound, so it runs behind an async
//! boundary: callers always `.await`, whether the work happens on tokio's
//! blocking pool ([`LocalSigner`]) or somewhere else entirely (a hardware
//! device, a remote signer).
//!
//! ## Why a trait?
//!
//! The builder should not care where keys live. It hands a secret and a
//! message hash to a [`SigningProvider`] and gets a [`Signature`] back.
//! Tests and the CLI use [`LocalSigner`]; anything fancier plugs in here.

use async_trait::async_trait;
use thiserror::Error;

use super::keys::{KeyError, PubKey, SecretKey, Signature};
use crate::types::Hash;

/// Errors during signature operations.
///
/// Deliberately coarse. Nobody outside needs to know *why* a check failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// An asynchronous signing capability.
///
/// `sign(secret, message_hash) -> signature`, nothing more.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// Signs a 32-byte message hash with `secret`.
    async fn sign(&self, secret: &SecretKey, message: &Hash) -> Result<Signature, SignatureError>;
}

/// Signs locally on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSigner;

#[async_trait]
impl SigningProvider for LocalSigner {
    async fn sign(&self, secret: &SecretKey, message: &Hash) -> Result<Signature, SignatureError> {
        let secret = secret.clone();
        let message = *message;
        let signature = tokio::task::spawn_blocking(move || secret.sign(&message))
            .await
            .map_err(|e| KeyError::TaskFailed(e.to_string()))??;
        Ok(signature)
    }
}

/// Sign a message hash synchronously.
///
/// ```
/// use mmx_protocol::crypto::{sign, verify, KeyPair};
/// use mmx_protocol::types::Hash;
///
/// let keypair = KeyPair::generate().unwrap();
/// let message = Hash::digest(b"send 100 MMX");
/// let signature = sign(keypair.secret(), &message).unwrap();
///
/// assert!(verify(keypair.public_key(), &message, &signature));
/// ```
pub fn sign(secret: &SecretKey, message: &Hash) -> Result<Signature, SignatureError> {
    Ok(secret.sign(message)?)
}

/// Verify a signature against a public key and message hash.
pub fn verify(public_key: &PubKey, message: &Hash, signature: &Signature) -> bool {
    public_key.verify(message, signature)
}

/// Verify from raw wire bytes.
///
/// The "I got these bytes off the wire" variant: parses both halves first.
pub fn verify_raw(
    public_key_bytes: &[u8],
    message: &Hash,
    signature_bytes: &[u8],
) -> Result<(), SignatureError> {
    let public_key = PubKey::from_slice(public_key_bytes)?;
    let signature = Signature::from_slice(signature_bytes)?;
    if public_key.verify(message, &signature) {
        Ok(())
    } else {
        Err(SignatureError::VerificationFailed)
    }
}
