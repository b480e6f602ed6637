//! Transaction signing.
//!
//! Signing happens in two phases so the builder can price signatures before
//! any exist:
//!
//! 1. [`resolve_owners`] walks the transaction and decides which owner
//!    authorizes each input and operation, and which owners still need a
//!    new solution. Pure, no keys involved.
//! 2. [`sign_transaction`] asks the wallet for each new owner's key, signs
//!    the `id` once per owner, appends the solutions and points every slot
//!    at its owner's solution index.
//!
//! Owner order: the `sender` first (only when the transaction has no
//! solutions yet), then inputs, then operations. Inputs flagged `IS_EXEC`
//! belong to an executing contract and are never signed here. Operations
//! without a `user` have no resolvable owner and are skipped with a warning.
//!
//! The `id` does not cover solution indices or solutions, so it is the same
//! before and after signing.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::error::TransactionError;
use super::solution::Solution;
use super::tx::Transaction;
use crate::config::NO_SOLUTION;
use crate::crypto::SigningProvider;
use crate::types::Address;
use crate::vault::Wallet;

/// Maps a contract address to the account that signs on its behalf.
pub type OwnerOverrides = HashMap<Address, Address>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Sender,
    Input(usize),
    Operation(usize),
}

/// Who signs for what, computed without touching keys.
#[derive(Debug, Clone, Default)]
pub struct SigningPlan {
    slots: Vec<(Slot, Address)>,
    existing: HashMap<Address, u16>,
    new_owners: Vec<Address>,
}

impl SigningPlan {
    /// Owners that need a fresh solution, in signing order.
    pub fn new_owners(&self) -> &[Address] {
        &self.new_owners
    }

    /// How many solutions signing will append.
    pub fn new_solutions(&self) -> usize {
        self.new_owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.new_owners.is_empty()
    }
}

/// Plans the owners of `tx`. See the module docs for the order.
pub fn resolve_owners(
    tx: &Transaction,
    overrides: &OwnerOverrides,
) -> Result<SigningPlan, TransactionError> {
    let mut plan = SigningPlan::default();
    for (index, solution) in tx.solutions.iter().enumerate() {
        let index = u16::try_from(index).map_err(|_| TransactionError::TooManySolutions)?;
        plan.existing.entry(solution.address()).or_insert(index);
    }

    let owner_of = |address: Address| overrides.get(&address).copied().unwrap_or(address);

    if tx.solutions.is_empty() {
        if let Some(sender) = tx.sender {
            plan.slots.push((Slot::Sender, sender));
        }
    }
    for (i, input) in tx.inputs.iter().enumerate() {
        if input.has_solution() || input.is_exec() {
            continue;
        }
        plan.slots.push((Slot::Input(i), owner_of(input.address)));
    }
    for (i, op) in tx.execute.iter().enumerate() {
        if op.solution() != NO_SOLUTION {
            continue;
        }
        match op.user() {
            Some(user) => plan.slots.push((Slot::Operation(i), owner_of(user))),
            None => warn!(
                operation = i,
                address = %op.call().address,
                method = %op.call().method,
                "operation has no user, skipping owner"
            ),
        }
    }

    for (_, owner) in &plan.slots {
        if !plan.existing.contains_key(owner) && !plan.new_owners.contains(owner) {
            plan.new_owners.push(*owner);
        }
    }
    // Index NO_SOLUTION is reserved.
    if tx.solutions.len() + plan.new_owners.len() > NO_SOLUTION as usize {
        return Err(TransactionError::TooManySolutions);
    }
    Ok(plan)
}

/// Resolves owners, signs once per new owner and finalizes the hashes.
///
/// Returns the number of solutions added. Fails before producing any
/// signature if the wallet lacks a key for one of the owners.
pub async fn sign_transaction(
    tx: &mut Transaction,
    wallet: &Wallet,
    overrides: &OwnerOverrides,
    signer: &dyn SigningProvider,
) -> Result<usize, TransactionError> {
    let plan = resolve_owners(tx, overrides)?;
    apply_plan(tx, &plan, wallet, signer).await?;
    tx.finalize()?;
    Ok(plan.new_solutions())
}

/// Signs per `plan`. The caller finalizes.
pub(crate) async fn apply_plan(
    tx: &mut Transaction,
    plan: &SigningPlan,
    wallet: &Wallet,
    signer: &dyn SigningProvider,
) -> Result<(), TransactionError> {
    let keys = plan
        .new_owners
        .iter()
        .map(|owner| {
            wallet
                .find_key(owner)
                .ok_or(TransactionError::UnknownOwner(*owner))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let id = tx.calc_hash(false)?;
    let mut index_of = plan.existing.clone();
    for (owner, key) in plan.new_owners.iter().zip(keys) {
        let signature = signer.sign(key.secret(), &id).await?;
        let index = u16::try_from(tx.solutions.len())
            .ok()
            .filter(|&i| i != NO_SOLUTION)
            .ok_or(TransactionError::TooManySolutions)?;
        tx.solutions.push(Solution::pubkey(*key.public_key(), signature));
        index_of.insert(*owner, index);
        debug!(owner = %owner, index, "signed");
    }

    for (slot, owner) in &plan.slots {
        let index = index_of
            .get(owner)
            .copied()
            .ok_or(TransactionError::UnknownOwner(*owner))?;
        match *slot {
            Slot::Sender => {}
            Slot::Input(i) => tx.inputs[i].solution = index,
            Slot::Operation(i) => tx.execute[i].call_mut().solution = index,
        }
    }
    Ok(())
}
