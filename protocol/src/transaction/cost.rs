//! The cost and fee model.
//!
//! Cost is a deterministic function of the transaction's shape and the chain
//! parameters:
//!
//! ```text
//! cost = min_txfee
//!      + min_txfee_exec * operations
//!      + exec_result cost
//!      + sum(I/O entry cost)          over inputs and outputs
//!      + sum(operation cost)
//!      + min_txfee_sign * solutions
//!      + deploy cost
//!
//! I/O entry = min_txfee_io + ceil(memo_len / 32) * min_txfee_memo
//! fee       = cost * fee_ratio / 1024      (128-bit intermediate, floor)
//! ```
//!
//! Every step is checked; overflowing 64 bits is an error, never a wrap.

use super::error::TransactionError;
use super::tx::Transaction;
use super::types::TxIo;
use crate::config::FEE_RATIO_BASE;
use crate::params::ChainParams;

pub(crate) fn checked_add(a: u64, b: u64, what: &'static str) -> Result<u64, TransactionError> {
    a.checked_add(b).ok_or(TransactionError::Overflow(what))
}

pub(crate) fn checked_mul(a: u64, b: u64, what: &'static str) -> Result<u64, TransactionError> {
    a.checked_mul(b).ok_or(TransactionError::Overflow(what))
}

/// Cost of a single input or output.
pub fn io_cost(io: &TxIo, params: &ChainParams) -> Result<u64, TransactionError> {
    io.validate()?;
    let memo = checked_mul(io.memo_chunks(), params.min_txfee_memo, "memo cost")?;
    checked_add(params.min_txfee_io, memo, "memo cost")
}

/// `cost * fee_ratio / 1024`, floored. The product is taken in 128 bits; the
/// result must fit a `u64`.
pub fn calc_fee(cost: u64, fee_ratio: u32) -> Result<u64, TransactionError> {
    let fee = cost as u128 * fee_ratio as u128 / FEE_RATIO_BASE as u128;
    u64::try_from(fee).map_err(|_| TransactionError::Overflow("fee"))
}

impl Transaction {
    /// The static cost of this transaction under `params`.
    pub fn calc_cost(&self, params: &ChainParams) -> Result<u64, TransactionError> {
        let mut cost = params.min_txfee;

        let ops = checked_mul(self.execute.len() as u64, params.min_txfee_exec, "exec cost")?;
        cost = checked_add(cost, ops, "static cost")?;

        if let Some(result) = &self.exec_result {
            cost = checked_add(cost, result.calc_cost(params)?, "static cost")?;
        }
        for input in &self.inputs {
            cost = checked_add(cost, io_cost(input, params)?, "static cost")?;
        }
        for output in &self.outputs {
            cost = checked_add(cost, io_cost(output, params)?, "static cost")?;
        }
        for op in &self.execute {
            cost = checked_add(cost, op.calc_cost(params)?, "static cost")?;
        }

        let sign = checked_mul(
            self.solutions.len() as u64,
            params.min_txfee_sign,
            "solution cost",
        )?;
        cost = checked_add(cost, sign, "static cost")?;

        if let Some(deploy) = &self.deploy {
            cost = checked_add(cost, deploy.calc_cost(params)?, "static cost")?;
        }
        Ok(cost)
    }

    /// Fee for the current `static_cost` at the current `fee_ratio`.
    pub fn static_fee(&self) -> Result<u64, TransactionError> {
        calc_fee(self.static_cost, self.fee_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Variant;
    use crate::transaction::operation::Execute;
    use crate::transaction::types::{TxIn, TxOut};
    use crate::types::{Address, Uint128};

    fn params() -> ChainParams {
        ChainParams::mainnet()
    }

    #[test]
    fn empty_transaction_costs_base_fee() {
        let tx = Transaction::default();
        assert_eq!(tx.calc_cost(&params()).unwrap(), params().min_txfee);
    }

    #[test]
    fn io_and_memo_cost() {
        let p = params();
        let mut tx = Transaction::default();
        tx.inputs.push(TxIn::new(Address::ZERO, Address::ZERO, Uint128::from(1u64)));
        tx.outputs.push(
            TxOut::new(Address::ZERO, Address::ZERO, Uint128::from(1u64)).with_memo("x".repeat(40)),
        );
        let expected = p.min_txfee + 2 * p.min_txfee_io + 2 * p.min_txfee_memo;
        assert_eq!(tx.calc_cost(&p).unwrap(), expected);
    }

    #[test]
    fn operations_add_exec_and_payload_cost() {
        let p = params();
        let mut tx = Transaction::default();
        let call = Execute::new(Address::new([1; 32]), "mint", vec![Variant::from(7u64)]);
        tx.execute.push(call.into());
        // "mint" = 4 bytes, U8 arg = 3 bytes.
        let expected = p.min_txfee + p.min_txfee_exec + 7 * p.min_txfee_byte;
        assert_eq!(tx.calc_cost(&p).unwrap(), expected);
    }

    #[test]
    fn memo_too_long_fails_cost() {
        let mut tx = Transaction::default();
        tx.outputs.push(
            TxOut::new(Address::ZERO, Address::ZERO, Uint128::from(1u64)).with_memo("x".repeat(65)),
        );
        assert!(matches!(
            tx.calc_cost(&params()),
            Err(TransactionError::MemoTooLong { .. })
        ));
    }

    #[test]
    fn overflow_is_an_error() {
        let mut p = params();
        p.min_txfee_io = u64::MAX;
        let mut tx = Transaction::default();
        tx.inputs.push(TxIn::new(Address::ZERO, Address::ZERO, Uint128::from(1u64)));
        let err = tx.calc_cost(&p).unwrap_err();
        assert!(err.is_overflow());
    }

    #[test]
    fn fee_is_floor_of_ratio() {
        assert_eq!(calc_fee(1000, 1024).unwrap(), 1000);
        assert_eq!(calc_fee(1000, 1536).unwrap(), 1500);
        assert_eq!(calc_fee(3, 1025).unwrap(), 3);
        assert_eq!(calc_fee(u64::MAX, 1024).unwrap(), u64::MAX);
        assert!(calc_fee(u64::MAX, 2048).unwrap_err().is_overflow());
    }
}
