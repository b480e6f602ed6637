//! Shape verification of a completed transaction.
//!
//! Everything the wallet can check without chain state: field sanity, hash
//! integrity, solution references and signatures, cost and fee bounds.
//! Balances, expiry against the current height and contract execution are
//! the node's business.
//!
//! Checks run cheapest first. Signatures are last.
//!
//! A solution referenced by an input must come from the input's owner, and
//! one referenced by an operation from its `user`'s owner. The owner is the
//! address itself unless an [`OwnerOverrides`] entry says otherwise, so a
//! transaction signed under overrides verifies only with the same map.
//! Inputs flagged `IS_EXEC` are produced by execution and never checked.

use tracing::debug;

use super::error::TransactionError;
use super::signing::OwnerOverrides;
use super::tx::Transaction;
use crate::config::NO_SOLUTION;
use crate::params::ChainParams;
use crate::types::Address;

/// Verifies `tx` against `params`, with every address owning itself.
/// Returns the first rule it breaks.
pub fn verify_transaction(tx: &Transaction, params: &ChainParams) -> Result<(), TransactionError> {
    verify_transaction_with_owners(tx, params, &OwnerOverrides::new())
}

/// Like [`verify_transaction`], resolving owners through `overrides` the
/// way the signing pass did.
pub fn verify_transaction_with_owners(
    tx: &Transaction,
    params: &ChainParams,
    overrides: &OwnerOverrides,
) -> Result<(), TransactionError> {
    if tx.nonce == 0 {
        return Err(TransactionError::ZeroNonce);
    }
    if tx.network.is_empty() {
        return Err(TransactionError::MissingNetwork);
    }
    if tx.fee_ratio < params.min_fee_ratio {
        return Err(TransactionError::FeeRatioTooLow {
            ratio: tx.fee_ratio,
            min: params.min_fee_ratio,
        });
    }
    tx.validate_memos()?;

    let id = tx.calc_hash(false)?;
    if id != tx.id {
        return Err(TransactionError::IdMismatch {
            expected: id,
            actual: tx.id,
        });
    }
    let content_hash = tx.calc_hash(true)?;
    if content_hash != tx.content_hash {
        return Err(TransactionError::ContentHashMismatch {
            expected: content_hash,
            actual: tx.content_hash,
        });
    }

    let count = tx.solutions.len();
    let references = tx
        .inputs
        .iter()
        .map(|i| i.solution)
        .chain(tx.execute.iter().map(|op| op.solution()));
    for index in references {
        if index != NO_SOLUTION && index as usize >= count {
            return Err(TransactionError::SolutionIndex { index, count });
        }
    }

    let owner_of = |address: Address| overrides.get(&address).copied().unwrap_or(address);
    let claims = tx
        .inputs
        .iter()
        .filter(|i| !i.is_exec())
        .map(|i| (i.solution, Some(i.address)))
        .chain(tx.execute.iter().map(|op| (op.solution(), op.user())));
    for (index, owned_by) in claims {
        let Some(solution) = tx.solutions.get(index as usize) else {
            continue;
        };
        // A call without a user has no owner to hold the solution to.
        let Some(address) = owned_by else {
            continue;
        };
        let expected = owner_of(address);
        let actual = solution.address();
        if actual != expected {
            return Err(TransactionError::SolutionOwner {
                index,
                expected,
                actual,
            });
        }
    }

    let cost = tx.calc_cost(params)?;
    if cost != tx.static_cost {
        return Err(TransactionError::CostMismatch {
            expected: cost,
            actual: tx.static_cost,
        });
    }
    if cost > params.max_tx_cost {
        return Err(TransactionError::CostTooHigh {
            cost,
            max: params.max_tx_cost,
        });
    }

    for (index, solution) in tx.solutions.iter().enumerate() {
        if !solution.verify(&id) {
            return Err(TransactionError::InvalidSignature { index });
        }
    }

    debug!(id = %id, cost, solutions = count, "transaction verified");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
