//! # Key Management
//!
//! secp256k1 key material for MMX signatures.
//!
//! - [`SecretKey`] - 32-byte scalar, zeroized on drop, never printed.
//! - [`PubKey`] - 33-byte compressed point, the form that is hashed into
//!   addresses and embedded in solutions.
//! - [`Signature`] - 64-byte compact ECDSA (`r ‖ s`, low-S), always over a
//!   32-byte message hash (the transaction id), never over raw bytes.
//!
//! Key bytes are never logged. Keep it that way.

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature as EcdsaSignature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};
use crate::types::{impl_serde_via_str, Address, Hash, TypeError};

/// Errors that can occur during key operations.
///
/// These stay vague about *why* key material was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("invalid secret key: not a valid secp256k1 scalar")]
    InvalidSecretKey,

    #[error("invalid public key: not a compressed secp256k1 point")]
    InvalidPublicKey,

    #[error("invalid signature encoding")]
    InvalidSignature,

    #[error("signing failed")]
    SigningFailed,

    #[error("key derivation failed: {0}")]
    Derivation(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("background key task failed: {0}")]
    TaskFailed(String),
}

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// A secp256k1 secret scalar.
///
/// Deliberately not `Serialize`: exporting a secret should be an explicit
/// call to [`SecretKey::as_bytes`], not a side effect of logging a struct.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; SECRET_KEY_LENGTH]);

impl SecretKey {
    /// Validates and wraps a 32-byte scalar. Zero and values `>= n` fail.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        k256::SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self(bytes))
    }

    /// Generates a fresh key from the OS RNG.
    pub fn generate() -> Self {
        let key = k256::SecretKey::random(&mut OsRng);
        let mut bytes = [0u8; SECRET_KEY_LENGTH];
        bytes.copy_from_slice(&key.to_bytes());
        Self(bytes)
    }

    /// The raw scalar. Handle with care.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LENGTH] {
        &self.0
    }

    /// Curve-multiplies the scalar into its compressed public key.
    pub fn public_key(&self) -> Result<PubKey, KeyError> {
        let key = k256::SecretKey::from_slice(&self.0).map_err(|_| KeyError::InvalidSecretKey)?;
        let point = key.public_key().to_encoded_point(true);
        PubKey::from_slice(point.as_bytes())
    }

    /// Signs a 32-byte message hash.
    pub fn sign(&self, message: &Hash) -> Result<Signature, KeyError> {
        let key = SigningKey::from_slice(&self.0).map_err(|_| KeyError::InvalidSecretKey)?;
        let sig: EcdsaSignature = key
            .sign_prehash(message.as_bytes())
            .map_err(|_| KeyError::SigningFailed)?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Signature::from_slice(&sig.to_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// PubKey
// ---------------------------------------------------------------------------

/// A compressed secp256k1 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PubKey([u8; PUBLIC_KEY_LENGTH]);

impl PubKey {
    /// Parses a 33-byte compressed point, rejecting anything off the curve.
    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Raw compressed encoding.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// The address owned by this key: SHA-256 of the compressed encoding.
    pub fn address(&self) -> Address {
        Address::from_public_key_bytes(&self.0)
    }

    /// Verifies `signature` over a 32-byte message hash.
    ///
    /// Returns a plain boolean; callers only need yes or no.
    pub fn verify(&self, message: &Hash, signature: &Signature) -> bool {
        let Ok(key) = VerifyingKey::from_sec1_bytes(&self.0) else {
            return false;
        };
        let Ok(sig) = EcdsaSignature::from_slice(signature.as_bytes()) else {
            return false;
        };
        key.verify_prehash(message.as_bytes(), &sig).is_ok()
    }

    /// Hex-encoded compressed point.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PubKey({})", self.to_hex())
    }
}

impl FromStr for PubKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes).map_err(|_| TypeError::InvalidLength {
            expected: PUBLIC_KEY_LENGTH,
            got: bytes.len(),
        })
    }
}

impl_serde_via_str!(PubKey);

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte compact ECDSA signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Wraps 64 bytes. The scalars are only range-checked at verification.
    pub fn from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self(bytes))
    }

    /// Raw `r ‖ s` bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Hex form.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl FromStr for Signature {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes).map_err(|_| TypeError::InvalidLength {
            expected: SIGNATURE_LENGTH,
            got: bytes.len(),
        })
    }
}

impl_serde_via_str!(Signature);

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

/// A secret key together with its public key and address.
///
/// The public half is computed once at construction, since every signing
/// request needs it for the solution and address lookups are hot.
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PubKey,
}

impl KeyPair {
    /// Builds a keypair from a secret, deriving the public key.
    pub fn from_secret(secret: SecretKey) -> Result<Self, KeyError> {
        let public = secret.public_key()?;
        Ok(Self { secret, public })
    }

    /// Builds a keypair from raw scalar bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LENGTH]) -> Result<Self, KeyError> {
        Self::from_secret(SecretKey::from_bytes(bytes)?)
    }

    /// Random keypair. Wallet keys come from [`crate::identity`] instead.
    pub fn generate() -> Result<Self, KeyError> {
        Self::from_secret(SecretKey::generate())
    }

    /// The secret half.
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    /// The compressed public key.
    pub fn public_key(&self) -> &PubKey {
        &self.public
    }

    /// The address this key signs for.
    pub fn address(&self) -> Address {
        self.public.address()
    }

    /// Signs a message hash.
    pub fn sign(&self, message: &Hash) -> Result<Signature, KeyError> {
        self.secret.sign(message)
    }

    /// Verifies a signature against this keypair's public key.
    pub fn verify(&self, message: &Hash, signature: &Signature) -> bool {
        self.public.verify(message, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair(pub={})", self.public.to_hex())
    }
}

impl PartialEq for KeyPair {
    /// Keypairs compare by public key; secrets are never compared directly.
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
    }
}

impl Eq for KeyPair {}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // Secret key 1 maps to the generator point.
    const ONE: [u8; 32] = hex!("0000000000000000000000000000000000000000000000000000000000000001");
    const GENERATOR: [u8; 33] =
        hex!("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");

    #[test]
    fn secret_one_yields_generator() {
        let kp = KeyPair::from_bytes(ONE).unwrap();
        assert_eq!(kp.public_key().as_bytes(), &GENERATOR);
    }

    #[test]
    fn zero_secret_is_rejected() {
        assert_eq!(
            SecretKey::from_bytes([0u8; 32]).unwrap_err(),
            KeyError::InvalidSecretKey
        );
        assert!(SecretKey::from_bytes([0xFF; 32]).is_err());
    }

    #[test]
    fn sign_and_verify() {
        let kp = KeyPair::generate().unwrap();
        let msg = Hash::digest(b"send 100 MMX");
        let sig = kp.sign(&msg).unwrap();
        assert!(kp.verify(&msg, &sig));
        assert!(!kp.verify(&Hash::digest(b"send 101 MMX"), &sig));
    }

    #[test]
    fn signing_is_deterministic() {
        // RFC 6979 nonces: same key and message, same signature.
        let kp = KeyPair::from_bytes(ONE).unwrap();
        let msg = Hash::digest(b"deterministic");
        assert_eq!(kp.sign(&msg).unwrap(), kp.sign(&msg).unwrap());
    }

    #[test]
    fn wrong_key_does_not_verify() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        let msg = Hash::digest(b"msg");
        let sig = a.sign(&msg).unwrap();
        assert!(!b.verify(&msg, &sig));
    }

    #[test]
    fn pubkey_rejects_uncompressed_and_garbage() {
        assert!(PubKey::from_slice(&[0u8; 33]).is_err());
        assert!(PubKey::from_slice(&GENERATOR[..32]).is_err());
    }

    #[test]
    fn address_is_sha256_of_compressed_key() {
        let kp = KeyPair::from_bytes(ONE).unwrap();
        assert_eq!(kp.address(), Address::new(crate::crypto::hash::sha256_array(&GENERATOR)));
    }

    #[test]
    fn pubkey_and_signature_json_round_trip() {
        let kp = KeyPair::generate().unwrap();
        let sig = kp.sign(&Hash::digest(b"json")).unwrap();

        let pk_json = serde_json::to_string(kp.public_key()).unwrap();
        let sig_json = serde_json::to_string(&sig).unwrap();
        assert_eq!(serde_json::from_str::<PubKey>(&pk_json).unwrap(), *kp.public_key());
        assert_eq!(serde_json::from_str::<Signature>(&sig_json).unwrap(), sig);
    }

    #[test]
    fn debug_output_hides_secret() {
        let kp = KeyPair::from_bytes(ONE).unwrap();
        let debug = format!("{:?} {:?}", kp, kp.secret());
        assert!(debug.contains("redacted"));
        assert!(!debug.contains("0000000000000000000000000000000000000000000000000000000000000001"));
    }
}
