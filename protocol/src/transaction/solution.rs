//! Signature solutions.
//!
//! A solution is a detached proof that an owner approved the transaction:
//! a compressed public key plus an ECDSA signature over the transaction
//! `id`. Inputs and operations reference solutions by index, so one
//! signature covers everything a single owner needs to authorize.

use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use crate::codec::ByteWriter;
use crate::config::TRANSACTION_VERSION;
use crate::crypto::{PubKey, Signature};
use crate::types::{Address, Hash};

pub const PUBKEY_SOLUTION_TYPE: &str = "mmx.solution.PubKey";

/// A public key and its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKeySolution {
    #[serde(default)]
    pub version: u32,
    pub pubkey: PubKey,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type")]
pub enum Solution {
    #[serde(rename = "mmx.solution.PubKey")]
    PubKey(PubKeySolution),
}

impl Solution {
    pub fn pubkey(pubkey: PubKey, signature: Signature) -> Self {
        Solution::PubKey(PubKeySolution {
            version: TRANSACTION_VERSION,
            pubkey,
            signature,
        })
    }

    /// The address this solution authorizes.
    pub fn address(&self) -> Address {
        match self {
            Solution::PubKey(s) => s.pubkey.address(),
        }
    }

    /// Checks the signature over `message` (the transaction id).
    pub fn verify(&self, message: &Hash) -> bool {
        match self {
            Solution::PubKey(s) => s.pubkey.verify(message, &s.signature),
        }
    }

    pub fn hash_serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let mut out = ByteWriter::with_capacity(160);
        match self {
            Solution::PubKey(s) => {
                out.write_type(PUBKEY_SOLUTION_TYPE);
                out.write_field("version", &s.version, true)?;
                out.write_field("pubkey", &s.pubkey, true)?;
                out.write_field("signature", &s.signature, true)?;
            }
        }
        Ok(out.into_inner())
    }

    pub fn calc_hash(&self) -> Result<Hash, TransactionError> {
        Ok(Hash::digest(&self.hash_serialize()?))
    }
}
