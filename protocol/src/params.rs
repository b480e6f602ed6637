//! # Chain Parameters
//!
//! Per-network fee and cost constants, supplied by the node and injected into
//! every cost and fee calculation. Two presets are built in; anything else
//! comes from JSON.
//!
//! [`ChainParamsCache`] holds one parameter set per network name. It is a
//! plain value owned by whoever composes the application, with explicit
//! [`invalidate`](ChainParamsCache::invalidate) and
//! [`clear`](ChainParamsCache::clear). There is no global state.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::FEE_RATIO_BASE;
use crate::types::Uint128;

/// Network name of the main chain.
pub const MAINNET: &str = "mainnet";

/// Network name of the current public testnet.
pub const TESTNET: &str = "testnet12";

/// Errors loading or resolving chain parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("no chain parameters known for network '{0}'")]
    UnknownNetwork(String),

    #[error("invalid chain parameters: {0}")]
    Invalid(String),

    #[error("failed to read chain parameters: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse chain parameters: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fee and cost constants for one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    /// Base cost of every transaction.
    pub min_txfee: u64,
    /// Cost per input or output.
    pub min_txfee_io: u64,
    /// Cost per solution.
    pub min_txfee_sign: u64,
    /// Cost per started 32-byte chunk of memo.
    pub min_txfee_memo: u64,
    /// Cost per operation.
    pub min_txfee_exec: u64,
    /// Cost per payload byte (operation arguments, deploy payload).
    pub min_txfee_byte: u64,
    /// Cost per deploy dependency.
    pub min_txfee_depend: u64,
    /// Lowest accepted fee ratio, in 1024ths.
    pub min_fee_ratio: u32,
    /// Upper bound on `static_cost`.
    pub max_tx_cost: u64,
    /// Decimals of the native currency.
    pub decimals: u32,
}

impl ChainParams {
    pub fn mainnet() -> Self {
        Self {
            min_txfee: 100,
            min_txfee_io: 100,
            min_txfee_sign: 1000,
            min_txfee_memo: 50,
            min_txfee_exec: 10_000,
            min_txfee_byte: 10,
            min_txfee_depend: 50_000,
            min_fee_ratio: FEE_RATIO_BASE,
            max_tx_cost: 100_000_000,
            decimals: 6,
        }
    }

    pub fn testnet() -> Self {
        Self {
            max_tx_cost: 1_000_000_000,
            ..Self::mainnet()
        }
    }

    /// The built-in preset for `network`, if there is one.
    pub fn preset(network: &str) -> Option<Self> {
        match network {
            MAINNET => Some(Self::mainnet()),
            TESTNET => Some(Self::testnet()),
            _ => None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Sanity checks that keep the fee math meaningful.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_fee_ratio < FEE_RATIO_BASE {
            return Err(ParamsError::Invalid(format!(
                "min_fee_ratio {} below {FEE_RATIO_BASE}",
                self.min_fee_ratio
            )));
        }
        if self.max_tx_cost < self.min_txfee {
            return Err(ParamsError::Invalid(
                "max_tx_cost is below min_txfee".to_string(),
            ));
        }
        if self.decimals > 18 {
            return Err(ParamsError::Invalid(format!(
                "decimals {} out of range",
                self.decimals
            )));
        }
        Ok(())
    }

    /// Renders a raw native amount as a decimal string, e.g. `1.5` for
    /// `1_500_000` at 6 decimals. Trailing zeros are dropped.
    pub fn format_amount(&self, amount: Uint128) -> String {
        let raw = amount.to_u128();
        let Some(scale) = 10u128.checked_pow(self.decimals) else {
            return raw.to_string();
        };
        let whole = raw / scale;
        let frac = raw % scale;
        if frac == 0 {
            return whole.to_string();
        }
        let digits = format!("{frac:0width$}", width = self.decimals as usize);
        format!("{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

// ---------------------------------------------------------------------------
// ChainParamsCache
// ---------------------------------------------------------------------------

/// Parameter sets keyed by network name.
///
/// Readers share an `Arc`; writers are rare (startup, explicit refresh), so
/// a `parking_lot::RwLock` is plenty.
#[derive(Debug, Default)]
pub struct ChainParamsCache {
    entries: RwLock<HashMap<String, Arc<ChainParams>>>,
}

impl ChainParamsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached parameters for `network`, if loaded.
    pub fn get(&self, network: &str) -> Option<Arc<ChainParams>> {
        self.entries.read().get(network).cloned()
    }

    /// Stores `params` for `network`, replacing any previous entry.
    pub fn insert(&self, network: &str, params: ChainParams) -> Arc<ChainParams> {
        let params = Arc::new(params);
        self.entries
            .write()
            .insert(network.to_string(), Arc::clone(&params));
        params
    }

    /// Cached parameters, loading them with `load` on a miss.
    pub fn get_or_load<F>(&self, network: &str, load: F) -> Result<Arc<ChainParams>, ParamsError>
    where
        F: FnOnce(&str) -> Result<ChainParams, ParamsError>,
    {
        if let Some(params) = self.get(network) {
            return Ok(params);
        }
        debug!(network, "loading chain parameters");
        let params = load(network)?;
        params.validate()?;
        // Another caller may have raced us here; last writer wins, both
        // values came from the same source.
        Ok(self.insert(network, params))
    }

    /// Cached parameters, falling back to the built-in preset.
    pub fn resolve(&self, network: &str) -> Result<Arc<ChainParams>, ParamsError> {
        self.get_or_load(network, |name| {
            ChainParams::preset(name).ok_or_else(|| ParamsError::UnknownNetwork(name.to_string()))
        })
    }

    /// Drops the entry for `network`. Returns whether one existed.
    pub fn invalidate(&self, network: &str) -> bool {
        self.entries.write().remove(network).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
