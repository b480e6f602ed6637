//! The deploy payload of a contract-creating transaction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cost::{checked_add, checked_mul};
use super::error::TransactionError;
use crate::codec::{ByteWriter, Variant};
use crate::params::ChainParams;
use crate::types::{Address, Hash};

pub const EXECUTABLE_TYPE: &str = "mmx.contract.Executable";

/// An executable contract: a binary plus its initialization call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "__type", rename = "mmx.contract.Executable")]
pub struct Executable {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub meta_data: Variant,
    /// Hash of the contract code.
    pub binary: Address,
    #[serde(default)]
    pub init_method: String,
    #[serde(default)]
    pub init_args: Vec<Variant>,
    /// Named contracts this one links against.
    #[serde(default)]
    pub depends: BTreeMap<String, Address>,
}

impl Executable {
    pub fn hash_serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let mut out = ByteWriter::with_capacity(512);
        out.write_type(EXECUTABLE_TYPE);
        out.write_field("version", &self.version, false)?;
        out.write_field("name", &self.name, false)?;
        out.write_field("symbol", &self.symbol, false)?;
        out.write_field("decimals", &self.decimals, false)?;
        out.write_field("meta_data", &self.meta_data, false)?;
        out.write_field("binary", &self.binary, false)?;
        out.write_field("init_method", &self.init_method, false)?;
        out.write_field("init_args", &self.init_args, false)?;
        out.write_field("depends", &self.depends, false)?;
        Ok(out.into_inner())
    }

    pub fn calc_hash(&self) -> Result<Hash, TransactionError> {
        Ok(Hash::digest(&self.hash_serialize()?))
    }

    /// Serialized size times `min_txfee_byte`, plus `min_txfee_depend` per
    /// dependency.
    pub fn calc_cost(&self, params: &ChainParams) -> Result<u64, TransactionError> {
        let size = self.hash_serialize()?.len() as u64;
        let bytes = checked_mul(size, params.min_txfee_byte, "deploy cost")?;
        let depends = checked_mul(
            self.depends.len() as u64,
            params.min_txfee_depend,
            "deploy cost",
        )?;
        checked_add(bytes, depends, "deploy cost")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Executable {
        Executable {
            name: "Test Token".into(),
            symbol: "TST".into(),
            decimals: 6,
            binary: Address::new([0xB1; 32]),
            init_method: "init".into(),
            init_args: vec![Variant::from(1_000_000u64)],
            ..Default::default()
        }
    }

    #[test]
    fn dependencies_add_cost() {
        let params = ChainParams::mainnet();
        let base = token();
        let mut linked = token();
        linked.depends.insert("lib".into(), Address::new([0xDD; 32]));

        let base_cost = base.calc_cost(&params).unwrap();
        let linked_cost = linked.calc_cost(&params).unwrap();
        assert!(linked_cost >= base_cost + params.min_txfee_depend);
        assert_eq!(
            base_cost,
            base.hash_serialize().unwrap().len() as u64 * params.min_txfee_byte
        );
    }

    #[test]
    fn hash_changes_with_content() {
        let mut other = token();
        other.symbol = "TSX".into();
        assert_ne!(token().calc_hash().unwrap(), other.calc_hash().unwrap());
    }

    #[test]
    fn json_round_trip_with_tag() {
        let exe = token();
        let json = serde_json::to_value(&exe).unwrap();
        assert_eq!(json["__type"], EXECUTABLE_TYPE);
        let back: Executable = serde_json::from_value(json).unwrap();
        assert_eq!(back, exe);
    }
}
