//! Core value types: transaction notes and I/O entries.
//!
//! Inputs and outputs share one shape, [`TxIo`]. An input additionally
//! points at the solution that authorizes it and carries flag bits.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::TransactionError;
use crate::codec::{ByteWriter, CodecError, WriteBytes};
use crate::config::{MAX_MEMO_LENGTH, MEMO_CHUNK_SIZE, NO_SOLUTION};
use crate::types::{Address, Uint128};

/// Input flag: the input is owned by an executing contract, not a key.
pub const IS_EXEC: u8 = 1 << 0;

// ---------------------------------------------------------------------------
// TxNote
// ---------------------------------------------------------------------------

/// What a transaction is for. Hashed as its upper-snake-case literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxNote {
    #[default]
    Transfer,
    Deploy,
    Execute,
    Deposit,
    Mutate,
    Offer,
    Trade,
    Withdraw,
    Burn,
    Claim,
    Mint,
    Revoke,
    Reward,
    TimelordReward,
}

impl TxNote {
    /// The literal written into the hash and the JSON document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "TRANSFER",
            Self::Deploy => "DEPLOY",
            Self::Execute => "EXECUTE",
            Self::Deposit => "DEPOSIT",
            Self::Mutate => "MUTATE",
            Self::Offer => "OFFER",
            Self::Trade => "TRADE",
            Self::Withdraw => "WITHDRAW",
            Self::Burn => "BURN",
            Self::Claim => "CLAIM",
            Self::Mint => "MINT",
            Self::Revoke => "REVOKE",
            Self::Reward => "REWARD",
            Self::TimelordReward => "TIMELORD_REWARD",
        }
    }
}

impl fmt::Display for TxNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WriteBytes for TxNote {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write_string(self.as_str());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TxIo
// ---------------------------------------------------------------------------

/// One movement of `amount` units of `contract` (the currency) from or to
/// `address`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIo {
    pub address: Address,
    /// Currency id; the zero address is the native coin.
    pub contract: Address,
    pub amount: Uint128,
    #[serde(default)]
    pub memo: Option<String>,
}

impl TxIo {
    pub fn new(address: Address, contract: Address, amount: Uint128) -> Self {
        Self {
            address,
            contract,
            amount,
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Memo length in bytes, zero when absent.
    pub fn memo_len(&self) -> usize {
        self.memo.as_ref().map_or(0, String::len)
    }

    /// Number of started 32-byte memo chunks; what the cost model charges.
    pub fn memo_chunks(&self) -> u64 {
        self.memo_len().div_ceil(MEMO_CHUNK_SIZE) as u64
    }

    pub fn validate(&self) -> Result<(), TransactionError> {
        let len = self.memo_len();
        if len > MAX_MEMO_LENGTH {
            return Err(TransactionError::MemoTooLong {
                len,
                max: MAX_MEMO_LENGTH,
            });
        }
        Ok(())
    }

    fn write_fields(&self, out: &mut ByteWriter) -> Result<(), CodecError> {
        out.write_field("address", &self.address, false)?;
        out.write_field("contract", &self.contract, false)?;
        out.write_field("amount", &self.amount, false)?;
        out.write_field("memo", &self.memo, false)
    }
}

// ---------------------------------------------------------------------------
// TxIn / TxOut
// ---------------------------------------------------------------------------

fn no_solution() -> u16 {
    NO_SOLUTION
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    #[serde(flatten)]
    pub io: TxIo,
    /// Index into `solutions`, or [`NO_SOLUTION`].
    #[serde(default = "no_solution")]
    pub solution: u16,
    #[serde(default)]
    pub flags: u8,
}

impl TxIn {
    pub fn new(address: Address, contract: Address, amount: Uint128) -> Self {
        Self::from(TxIo::new(address, contract, amount))
    }

    pub fn has_solution(&self) -> bool {
        self.solution != NO_SOLUTION
    }

    pub fn is_exec(&self) -> bool {
        self.flags & IS_EXEC != 0
    }
}

impl From<TxIo> for TxIn {
    fn from(io: TxIo) -> Self {
        Self {
            io,
            solution: NO_SOLUTION,
            flags: 0,
        }
    }
}

impl std::ops::Deref for TxIn {
    type Target = TxIo;

    fn deref(&self) -> &TxIo {
        &self.io
    }
}

impl WriteBytes for TxIn {
    /// `txin_t<>` + the I/O fields; `solution` and `flags` only in full mode.
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        out.write(b"txin_t<>");
        self.io.write_fields(out)?;
        if full_hash {
            out.write_field("solution", &self.solution, full_hash)?;
            out.write_field("flags", &self.flags, full_hash)?;
        }
        Ok(())
    }
}

/// A transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxOut(pub TxIo);

impl TxOut {
    pub fn new(address: Address, contract: Address, amount: Uint128) -> Self {
        Self(TxIo::new(address, contract, amount))
    }

    pub fn with_memo(self, memo: impl Into<String>) -> Self {
        Self(self.0.with_memo(memo))
    }
}

impl From<TxIo> for TxOut {
    fn from(io: TxIo) -> Self {
        Self(io)
    }
}

impl std::ops::Deref for TxOut {
    type Target = TxIo;

    fn deref(&self) -> &TxIo {
        &self.0
    }
}

impl WriteBytes for TxOut {
    fn write_bytes(&self, out: &mut ByteWriter, _: bool) -> Result<(), CodecError> {
        out.write(b"txout_t<>");
        self.0.write_fields(out)
    }
}
