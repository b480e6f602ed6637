//! Contract calls embedded in a transaction.
//!
//! An [`Operation`] is either a plain [`Execute`] call or a [`Deposit`],
//! which is a call that also moves `amount` of `currency` into the contract.
//! Each has its own two-mode hash and its own cost; the transaction only
//! ever sees the hashes.

use serde::{Deserialize, Serialize};

use super::cost::{checked_add, checked_mul};
use super::error::TransactionError;
use crate::codec::{ByteWriter, Variant};
use crate::config::{NO_SOLUTION, TRANSACTION_VERSION};
use crate::params::ChainParams;
use crate::types::{Address, Hash, Uint128};

pub const EXECUTE_TYPE: &str = "mmx.operation.Execute";
pub const DEPOSIT_TYPE: &str = "mmx.operation.Deposit";

fn no_solution() -> u16 {
    NO_SOLUTION
}

/// A contract method call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execute {
    #[serde(default)]
    pub version: u32,
    /// The contract being called.
    pub address: Address,
    #[serde(default = "no_solution")]
    pub solution: u16,
    pub method: String,
    #[serde(default)]
    pub args: Vec<Variant>,
    /// The account on whose behalf the call is made; it signs for it.
    #[serde(default)]
    pub user: Option<Address>,
}

impl Execute {
    pub fn new(address: Address, method: impl Into<String>, args: Vec<Variant>) -> Self {
        Self {
            version: TRANSACTION_VERSION,
            address,
            solution: NO_SOLUTION,
            method: method.into(),
            args,
            user: None,
        }
    }

    pub fn with_user(mut self, user: Address) -> Self {
        self.user = Some(user);
        self
    }

    fn write_fields(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), TransactionError> {
        out.write_field("version", &self.version, full_hash)?;
        out.write_field("address", &self.address, full_hash)?;
        if full_hash {
            out.write_field("solution", &self.solution, full_hash)?;
        }
        out.write_field("method", &self.method, full_hash)?;
        out.write_field("args", &self.args, full_hash)?;
        out.write_field("user", &self.user, full_hash)?;
        Ok(())
    }

    /// Payload bytes the cost model charges for: method name plus encoded args.
    pub fn payload_len(&self) -> Result<u64, TransactionError> {
        let mut total = self.method.len() as u64;
        for arg in &self.args {
            total = checked_add(total, arg.encoded_len()? as u64, "operation payload")?;
        }
        Ok(total)
    }
}

/// A call that also deposits funds into the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(flatten)]
    pub call: Execute,
    pub currency: Address,
    pub amount: Uint128,
}

impl Deposit {
    pub fn new(call: Execute, currency: Address, amount: Uint128) -> Self {
        Self {
            call,
            currency,
            amount,
        }
    }
}

/// A contract call, tagged by type name in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type")]
pub enum Operation {
    #[serde(rename = "mmx.operation.Execute")]
    Execute(Execute),
    #[serde(rename = "mmx.operation.Deposit")]
    Deposit(Deposit),
}

impl Operation {
    pub fn call(&self) -> &Execute {
        match self {
            Operation::Execute(call) => call,
            Operation::Deposit(deposit) => &deposit.call,
        }
    }

    pub fn call_mut(&mut self) -> &mut Execute {
        match self {
            Operation::Execute(call) => call,
            Operation::Deposit(deposit) => &mut deposit.call,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Operation::Execute(_) => EXECUTE_TYPE,
            Operation::Deposit(_) => DEPOSIT_TYPE,
        }
    }

    pub fn solution(&self) -> u16 {
        self.call().solution
    }

    pub fn user(&self) -> Option<Address> {
        self.call().user
    }

    /// `(currency, amount)` for deposits.
    pub fn deposit(&self) -> Option<(Address, Uint128)> {
        match self {
            Operation::Deposit(d) => Some((d.currency, d.amount)),
            Operation::Execute(_) => None,
        }
    }

    /// Canonical bytes hashed into [`Operation::calc_hash`].
    pub fn hash_serialize(&self, full_hash: bool) -> Result<Vec<u8>, TransactionError> {
        let mut out = ByteWriter::with_capacity(256);
        out.write_type(self.type_name());
        self.call().write_fields(&mut out, full_hash)?;
        if let Operation::Deposit(d) = self {
            out.write_field("currency", &d.currency, full_hash)?;
            out.write_field("amount", &d.amount, full_hash)?;
        }
        Ok(out.into_inner())
    }

    pub fn calc_hash(&self, full_hash: bool) -> Result<Hash, TransactionError> {
        Ok(Hash::digest(&self.hash_serialize(full_hash)?))
    }

    /// `payload bytes * min_txfee_byte`, plus `min_txfee_io` for deposits.
    pub fn calc_cost(&self, params: &ChainParams) -> Result<u64, TransactionError> {
        let payload = self.call().payload_len()?;
        let mut cost = checked_mul(payload, params.min_txfee_byte, "operation cost")?;
        if let Operation::Deposit(_) = self {
            cost = checked_add(cost, params.min_txfee_io, "operation cost")?;
        }
        Ok(cost)
    }
}

impl From<Execute> for Operation {
    fn from(call: Execute) -> Self {
        Operation::Execute(call)
    }
}

impl From<Deposit> for Operation {
    fn from(deposit: Deposit) -> Self {
        Operation::Deposit(deposit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> Address {
        Address::new([0xC0; 32])
    }

    fn transfer_call() -> Execute {
        Execute::new(
            contract(),
            "transfer",
            vec![Variant::from("mmx1dest"), Variant::from(500u64)],
        )
        .with_user(Address::new([0x11; 32]))
    }

    #[test]
    fn solution_only_affects_full_hash() {
        let mut op = Operation::from(transfer_call());
        let id_before = op.calc_hash(false).unwrap();
        let full_before = op.calc_hash(true).unwrap();

        op.call_mut().solution = 0;
        assert_eq!(op.calc_hash(false).unwrap(), id_before);
        assert_ne!(op.calc_hash(true).unwrap(), full_before);
    }

    #[test]
    fn deposit_hash_covers_amount() {
        let a = Operation::from(Deposit::new(transfer_call(), Address::ZERO, 10u64.into()));
        let b = Operation::from(Deposit::new(transfer_call(), Address::ZERO, 11u64.into()));
        assert_ne!(a.calc_hash(false).unwrap(), b.calc_hash(false).unwrap());

        let exec = Operation::from(transfer_call());
        assert_ne!(a.calc_hash(false).unwrap(), exec.calc_hash(false).unwrap());
    }

    #[test]
    fn cost_is_payload_proportional() {
        let params = ChainParams::mainnet();
        let call = transfer_call();
        let payload = "transfer".len() as u64
            + call.args.iter().map(|a| a.encoded_len().unwrap() as u64).sum::<u64>();

        let exec = Operation::from(call.clone());
        assert_eq!(exec.calc_cost(&params).unwrap(), payload * params.min_txfee_byte);

        let deposit = Operation::from(Deposit::new(call, Address::ZERO, 1u64.into()));
        assert_eq!(
            deposit.calc_cost(&params).unwrap(),
            payload * params.min_txfee_byte + params.min_txfee_io
        );
    }

    #[test]
    fn json_carries_type_tag() {
        let op = Operation::from(Deposit::new(transfer_call(), Address::ZERO, 42u64.into()));
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["__type"], DEPOSIT_TYPE);
        assert_eq!(json["method"], "transfer");
        assert_eq!(json["amount"], 42);

        let back: Operation = serde_json::from_value(json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn deep_args_fail_to_hash() {
        let mut arg = Variant::Null;
        for _ in 0..150 {
            arg = Variant::List(vec![arg]);
        }
        let op = Operation::from(Execute::new(contract(), "f", vec![arg]));
        assert!(matches!(op.calc_hash(false), Err(TransactionError::Codec(_))));
    }
}
