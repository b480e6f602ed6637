//! Execution results attached by the node after running a transaction.
//!
//! The wallet never produces these; it only has to hash and cost them
//! exactly like the node does, since they are part of the content hash.

use serde::{Deserialize, Serialize};

use super::cost::{checked_add, checked_mul, io_cost};
use super::error::TransactionError;
use super::types::{TxIn, TxOut};
use crate::codec::{ByteWriter, CodecError, WriteBytes};
use crate::params::ChainParams;
use crate::types::Hash;

pub const EXEC_RESULT_TYPE: &str = "mmx.exec_result_t";

/// Why execution failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecError {
    pub code: u32,
    /// Instruction address inside the contract.
    pub address: u32,
    /// Index of the failing operation.
    pub operation: u32,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub message: String,
}

impl WriteBytes for ExecError {
    fn write_bytes(&self, out: &mut ByteWriter, full_hash: bool) -> Result<(), CodecError> {
        out.write(b"exec_error_t<>");
        out.write_field("code", &self.code, full_hash)?;
        out.write_field("address", &self.address, full_hash)?;
        out.write_field("operation", &self.operation, full_hash)?;
        out.write_field("line", &self.line, full_hash)?;
        out.write_field("message", &self.message, full_hash)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub did_fail: bool,
    pub total_cost: u64,
    pub total_fee: u64,
    #[serde(default)]
    pub inputs: Vec<TxIn>,
    #[serde(default)]
    pub outputs: Vec<TxOut>,
    #[serde(default)]
    pub error: Option<ExecError>,
}

impl ExecutionResult {
    pub fn hash_serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let mut out = ByteWriter::with_capacity(256);
        out.write_type(EXEC_RESULT_TYPE);
        out.write_field("did_fail", &self.did_fail, true)?;
        out.write_field("total_cost", &self.total_cost, true)?;
        out.write_field("total_fee", &self.total_fee, true)?;
        out.write_field("inputs", &self.inputs, true)?;
        out.write_field("outputs", &self.outputs, true)?;
        out.write_field("error", &self.error, true)?;
        Ok(out.into_inner())
    }

    pub fn calc_hash(&self) -> Result<Hash, TransactionError> {
        Ok(Hash::digest(&self.hash_serialize()?))
    }

    /// I/O entry cost over inputs and outputs, plus the error message bytes.
    pub fn calc_cost(&self, params: &ChainParams) -> Result<u64, TransactionError> {
        let mut cost = 0u64;
        for input in &self.inputs {
            cost = checked_add(cost, io_cost(input, params)?, "exec result cost")?;
        }
        for output in &self.outputs {
            cost = checked_add(cost, io_cost(output, params)?, "exec result cost")?;
        }
        if let Some(error) = &self.error {
            let message = checked_mul(
                error.message.len() as u64,
                params.min_txfee_byte,
                "exec result cost",
            )?;
            cost = checked_add(cost, message, "exec result cost")?;
        }
        Ok(cost)
    }
}
