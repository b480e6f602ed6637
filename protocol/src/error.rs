//! Crate-level error.
//!
//! Each module keeps its own `thiserror` enum. [`Error`] wraps them so
//! applications can use one `?`-friendly type, and [`Error::kind`] sorts
//! them into the few categories callers actually branch on.

use thiserror::Error;

use crate::codec::CodecError;
use crate::crypto::{KeyError, SignatureError};
use crate::params::ParamsError;
use crate::transaction::TransactionError;
use crate::types::TypeError;
use crate::vault::WalletError;

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or a broken rule: bad address, memo too long, bad
    /// signature, unsupported value, hash mismatch.
    Validation,
    /// An amount or cost left its 64- or 128-bit range.
    Overflow,
    /// Missing or inconsistent options or chain parameters.
    Configuration,
    /// A background task failed to complete.
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Type(e) if e.is_overflow() => ErrorKind::Overflow,
            Error::Type(_) | Error::Codec(_) => ErrorKind::Validation,
            Error::Key(e) | Error::Signature(SignatureError::Key(e)) => key_kind(e),
            Error::Signature(_) => ErrorKind::Validation,
            Error::Params(_) => ErrorKind::Configuration,
            Error::Wallet(WalletError::Key(e)) => key_kind(e),
            Error::Wallet(WalletError::NoAddresses) => ErrorKind::Configuration,
            Error::Transaction(e) => transaction_kind(e),
        }
    }
}

fn key_kind(err: &KeyError) -> ErrorKind {
    match err {
        KeyError::TaskFailed(_) => ErrorKind::Internal,
        _ => ErrorKind::Validation,
    }
}

fn transaction_kind(err: &TransactionError) -> ErrorKind {
    match err {
        TransactionError::Overflow(_) => ErrorKind::Overflow,
        TransactionError::Configuration(_) => ErrorKind::Configuration,
        TransactionError::Key(e) | TransactionError::Signing(SignatureError::Key(e)) => key_kind(e),
        _ => ErrorKind::Validation,
    }
}
