//! The transaction aggregate and its two-mode hash.
//!
//! `hash_serialize(full)` writes, in this exact order:
//!
//! ```text
//! type("mmx.Transaction")
//! version, expires, fee_ratio, max_fee_amount, note, nonce, network, sender
//! inputs                    (solution + flags only when full)
//! outputs
//! execute                   (operation hashes, same mode)
//! deploy                    (hash, or zero hash)
//! -- full only --
//! static_cost
//! solutions                 (solution hashes)
//! exec_result               (hash, or zero hash)
//! ```
//!
//! `id = calc_hash(false)` is what gets signed, so it cannot cover the
//! signatures. `content_hash = calc_hash(true)` covers everything. Both are
//! recomputed by [`Transaction::finalize`]; nothing trusts stored values.
//!
//! Any change to this order breaks interoperability with the node.

use serde::{Deserialize, Serialize};

use super::contract::Executable;
use super::error::TransactionError;
use super::operation::Operation;
use super::result::ExecutionResult;
use super::solution::Solution;
use super::types::{TxIn, TxNote, TxOut};
use crate::codec::{compress_json, decompress_json, ByteWriter};
use crate::config::{FEE_RATIO_BASE, TRANSACTION_VERSION};
use crate::types::{Address, Hash, Uint128};

pub const TRANSACTION_TYPE: &str = "mmx.Transaction";

/// An MMX transaction. Built, signed and handed off; never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type", rename = "mmx.Transaction", default)]
pub struct Transaction {
    pub id: Hash,
    pub version: u32,
    /// Height after which the transaction is no longer valid.
    pub expires: u32,
    /// Fee multiplier in 1024ths.
    pub fee_ratio: u32,
    pub static_cost: u64,
    pub max_fee_amount: u64,
    pub note: TxNote,
    pub nonce: u64,
    pub network: String,
    /// The account paying the fee.
    pub sender: Option<Address>,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub execute: Vec<Operation>,
    pub solutions: Vec<Solution>,
    pub deploy: Option<Executable>,
    pub exec_result: Option<ExecutionResult>,
    pub content_hash: Hash,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            id: Hash::ZERO,
            version: TRANSACTION_VERSION,
            expires: 0,
            fee_ratio: FEE_RATIO_BASE,
            static_cost: 0,
            max_fee_amount: 0,
            note: TxNote::Transfer,
            nonce: 0,
            network: String::new(),
            sender: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            execute: Vec::new(),
            solutions: Vec::new(),
            deploy: None,
            exec_result: None,
            content_hash: Hash::ZERO,
        }
    }
}

impl Transaction {
    pub fn new(note: TxNote) -> Self {
        Self {
            note,
            ..Self::default()
        }
    }

    /// Appends an output paying `amount` of `currency` to `address`.
    pub fn add_output(&mut self, currency: Address, address: Address, amount: Uint128) -> &mut TxOut {
        self.outputs.push(TxOut::new(address, currency, amount));
        let last = self.outputs.len() - 1;
        &mut self.outputs[last]
    }

    /// Appends an unsigned input spending `amount` of `currency` from `address`.
    pub fn add_input(&mut self, currency: Address, address: Address, amount: Uint128) -> &mut TxIn {
        self.inputs.push(TxIn::new(address, currency, amount));
        let last = self.inputs.len() - 1;
        &mut self.inputs[last]
    }

    /// Canonical bytes for the `full` or reduced hash.
    pub fn hash_serialize(&self, full_hash: bool) -> Result<Vec<u8>, TransactionError> {
        let mut out = ByteWriter::with_capacity(1024);
        out.write_type(TRANSACTION_TYPE);
        out.write_field("version", &self.version, full_hash)?;
        out.write_field("expires", &self.expires, full_hash)?;
        out.write_field("fee_ratio", &self.fee_ratio, full_hash)?;
        out.write_field("max_fee_amount", &self.max_fee_amount, full_hash)?;
        out.write_field("note", &self.note, full_hash)?;
        out.write_field("nonce", &self.nonce, full_hash)?;
        out.write_field("network", &self.network, full_hash)?;
        out.write_field("sender", &self.sender, full_hash)?;
        out.write_field("inputs", &self.inputs, full_hash)?;
        out.write_field("outputs", &self.outputs, full_hash)?;

        let ops = self
            .execute
            .iter()
            .map(|op| op.calc_hash(full_hash))
            .collect::<Result<Vec<_>, _>>()?;
        out.write_field("execute", &ops, full_hash)?;

        let deploy = match &self.deploy {
            Some(exe) => exe.calc_hash()?,
            None => Hash::ZERO,
        };
        out.write_field("deploy", &deploy, full_hash)?;

        if full_hash {
            out.write_field("static_cost", &self.static_cost, full_hash)?;

            let solutions = self
                .solutions
                .iter()
                .map(Solution::calc_hash)
                .collect::<Result<Vec<_>, _>>()?;
            out.write_field("solutions", &solutions, full_hash)?;

            let exec_result = match &self.exec_result {
                Some(result) => result.calc_hash()?,
                None => Hash::ZERO,
            };
            out.write_field("exec_result", &exec_result, full_hash)?;
        }
        Ok(out.into_inner())
    }

    pub fn calc_hash(&self, full_hash: bool) -> Result<Hash, TransactionError> {
        Ok(Hash::digest(&self.hash_serialize(full_hash)?))
    }

    /// Recomputes and stores `id` and `content_hash`.
    pub fn finalize(&mut self) -> Result<(), TransactionError> {
        self.id = self.calc_hash(false)?;
        self.content_hash = self.calc_hash(true)?;
        Ok(())
    }

    /// Whether the stored hashes match the current content.
    pub fn is_finalized(&self) -> bool {
        matches!(
            (self.calc_hash(false), self.calc_hash(true)),
            (Ok(id), Ok(content)) if id == self.id && content == self.content_hash
        )
    }

    /// Checks every memo against the length limit.
    pub fn validate_memos(&self) -> Result<(), TransactionError> {
        self.inputs.iter().try_for_each(|i| i.validate())?;
        self.outputs.iter().try_for_each(|o| o.validate())
    }

    /// Sum of inputs spending `currency`.
    pub fn input_total(&self, currency: &Address) -> Result<Uint128, TransactionError> {
        sum_amounts(self.inputs.iter().map(|i| &i.io), currency, "input total")
    }

    /// Sum of outputs paying `currency`.
    pub fn output_total(&self, currency: &Address) -> Result<Uint128, TransactionError> {
        sum_amounts(self.outputs.iter().map(|o| &o.0), currency, "output total")
    }

    /// Sum of deposit operations moving `currency`.
    pub fn deposit_total(&self, currency: &Address) -> Result<Uint128, TransactionError> {
        self.execute
            .iter()
            .filter_map(Operation::deposit)
            .filter(|(c, _)| c == currency)
            .try_fold(Uint128::ZERO, |acc, (_, amount)| {
                acc.checked_add(amount)
                    .ok_or(TransactionError::Overflow("deposit total"))
            })
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TransactionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The compressed base64url form for QR codes and links.
    pub fn to_transport(&self) -> Result<String, TransactionError> {
        Ok(compress_json(&self.to_json()?)?)
    }

    pub fn from_transport(text: &str) -> Result<Self, TransactionError> {
        Self::from_json(&decompress_json(text)?)
    }
}

fn sum_amounts<'a>(
    entries: impl Iterator<Item = &'a super::types::TxIo>,
    currency: &Address,
    what: &'static str,
) -> Result<Uint128, TransactionError> {
    entries
        .filter(|io| io.contract == *currency)
        .try_fold(Uint128::ZERO, |acc, io| {
            acc.checked_add(io.amount).ok_or(TransactionError::Overflow(what))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Variant;
    use crate::crypto::KeyPair;
    use crate::transaction::operation::{Deposit, Execute};

    fn sample() -> Transaction {
        let mut tx = Transaction::new(TxNote::Transfer);
        tx.expires = 1000;
        tx.nonce = 42;
        tx.network = "mainnet".into();
        tx.sender = Some(Address::new([1; 32]));
        tx.add_input(Address::ZERO, Address::new([1; 32]), 500u64.into());
        tx.add_output(Address::ZERO, Address::new([2; 32]), 400u64.into())
            .0
            .memo = Some("thanks".into());
        tx
    }

    #[test]
    fn id_excludes_solutions_content_hash_includes_them() {
        let mut tx = sample();
        tx.finalize().unwrap();
        let (id, content) = (tx.id, tx.content_hash);
        assert_ne!(id, content);

        let kp = KeyPair::generate().unwrap();
        tx.solutions
            .push(Solution::pubkey(*kp.public_key(), kp.sign(&id).unwrap()));
        tx.inputs[0].solution = 0;
        tx.finalize().unwrap();

        assert_eq!(tx.id, id);
        assert_ne!(tx.content_hash, content);
    }

    #[test]
    fn static_cost_only_in_full_hash() {
        let mut tx = sample();
        let id = tx.calc_hash(false).unwrap();
        let full = tx.calc_hash(true).unwrap();
        tx.static_cost = 12345;
        assert_eq!(tx.calc_hash(false).unwrap(), id);
        assert_ne!(tx.calc_hash(true).unwrap(), full);
    }

    #[test]
    fn every_id_field_matters() {
        let base = sample().calc_hash(false).unwrap();
        let mut changes: Vec<Box<dyn Fn(&mut Transaction)>> = vec![
            Box::new(|tx| tx.version = 1),
            Box::new(|tx| tx.expires += 1),
            Box::new(|tx| tx.fee_ratio += 1),
            Box::new(|tx| tx.max_fee_amount += 1),
            Box::new(|tx| tx.note = TxNote::Burn),
            Box::new(|tx| tx.nonce += 1),
            Box::new(|tx| tx.network = "testnet12".into()),
            Box::new(|tx| tx.sender = None),
            Box::new(|tx| tx.outputs[0].0.amount = 1u64.into()),
            Box::new(|tx| tx.deploy = Some(Executable::default())),
        ];
        for (i, change) in changes.drain(..).enumerate() {
            let mut tx = sample();
            change(&mut tx);
            assert_ne!(tx.calc_hash(false).unwrap(), base, "change {i}");
        }
    }

    #[test]
    fn is_finalized_tracks_mutation() {
        let mut tx = sample();
        assert!(!tx.is_finalized());
        tx.finalize().unwrap();
        assert!(tx.is_finalized());
        tx.nonce += 1;
        assert!(!tx.is_finalized());
    }

    #[test]
    fn totals_by_currency() {
        let token = Address::new([9; 32]);
        let mut tx = sample();
        tx.add_output(token, Address::new([3; 32]), 5u64.into());
        tx.execute.push(
            Deposit::new(
                Execute::new(Address::new([4; 32]), "deposit", vec![]),
                token,
                7u64.into(),
            )
            .into(),
        );
        assert_eq!(tx.input_total(&Address::ZERO).unwrap(), 500u64.into());
        assert_eq!(tx.output_total(&Address::ZERO).unwrap(), 400u64.into());
        assert_eq!(tx.output_total(&token).unwrap(), 5u64.into());
        assert_eq!(tx.deposit_total(&token).unwrap(), 7u64.into());
        assert_eq!(tx.deposit_total(&Address::ZERO).unwrap(), Uint128::ZERO);
    }

    #[test]
    fn json_round_trip_is_stable() {
        let mut tx = sample();
        tx.execute.push(
            Execute::new(
                Address::new([5; 32]),
                "vote",
                vec![Variant::from(-1i64), Variant::from("yes")],
            )
            .with_user(Address::new([1; 32]))
            .into(),
        );
        tx.outputs[0].0.amount = Uint128::from_limbs(0, 1);
        tx.finalize().unwrap();

        let json = tx.to_json().unwrap();
        assert!(json.starts_with(r#"{"__type":"mmx.Transaction""#));
        assert!(json.contains(r#""amount":"18446744073709551616""#));

        let parsed = Transaction::from_json(&json).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(parsed.to_json().unwrap(), json);
    }

    #[test]
    fn transport_round_trip() {
        let mut tx = sample();
        tx.finalize().unwrap();
        let packed = tx.to_transport().unwrap();
        assert_eq!(Transaction::from_transport(&packed).unwrap(), tx);
    }
}
