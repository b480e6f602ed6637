// Copyright (c) 2026 MMX Wallet Developers. MIT License.
// See LICENSE for details.

//! # MMX Wallet CLI
//!
//! Entry point for the `mmx-wallet` binary. Parses CLI arguments,
//! initializes logging, resolves chain parameters and runs one command.
//!
//! - `new-seed` - generate a seed and its mnemonic
//! - `keys`     - fingerprint, addresses and farmer key of a wallet
//! - `send`     - build, fund and sign a transfer
//! - `hash`     - recompute hashes and cost, verify
//! - `pack`     - JSON document to transport text
//! - `unpack`   - transport text to JSON document

mod cli;
mod logging;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use mmx_protocol::identity::{mnemonic_to_seed, seed_to_mnemonic, Seed};
use mmx_protocol::params::{ChainParams, ChainParamsCache};
use mmx_protocol::transaction::{
    verify_transaction, Completer, Transaction, TxNote, TxOptions,
};
use mmx_protocol::types::{Address, Uint128};
use mmx_protocol::vault::Wallet;

use cli::{Commands, MmxWalletCli, SeedArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = MmxWalletCli::parse();
    logging::init_logging("mmx_wallet=info,mmx_protocol=warn", cli.log_format.into());

    match cli.command {
        Commands::NewSeed => new_seed(),
        Commands::Keys(args) => show_keys(args).await,
        Commands::Send(args) => {
            let params = load_params(&cli.network, cli.params.as_deref())?;
            send(args, &cli.network, &params).await
        }
        Commands::Hash(args) => {
            let params = load_params(&cli.network, cli.params.as_deref())?;
            hash_document(&args.input, &params)
        }
        Commands::Pack(args) => {
            let tx = read_document(&args.input)?;
            println!("{}", tx.to_transport().context("failed to pack transaction")?);
            Ok(())
        }
        Commands::Unpack(args) => {
            let text = if args.text == "-" {
                read_stdin()?
            } else {
                args.text
            };
            let tx = Transaction::from_transport(text.trim())
                .context("failed to unpack transport text")?;
            println!("{}", tx.to_json_pretty()?);
            Ok(())
        }
    }
}

/// Chain parameters from `--params`, or the preset for `network`.
fn load_params(network: &str, path: Option<&Path>) -> Result<Arc<ChainParams>> {
    let cache = ChainParamsCache::new();
    match path {
        Some(path) => {
            let params = ChainParams::from_file(path)
                .with_context(|| format!("failed to load chain parameters from {}", path.display()))?;
            Ok(cache.insert(network, params))
        }
        None => cache
            .resolve(network)
            .with_context(|| format!("no chain parameters for network '{network}'")),
    }
}

fn seed_from_args(args: &SeedArgs) -> Result<Seed> {
    match (&args.seed, &args.mnemonic) {
        (Some(hex), None) => Seed::from_hex(hex.trim()).context("invalid --seed"),
        (None, Some(phrase)) => mnemonic_to_seed(phrase).context("invalid --mnemonic"),
        _ => bail!("exactly one of --seed or --mnemonic is required"),
    }
}

fn new_seed() -> Result<()> {
    let seed = Seed::generate();
    println!("seed:     {}", hex::encode(seed.as_bytes()));
    println!("mnemonic: {}", seed_to_mnemonic(&seed)?);
    Ok(())
}

#[derive(Serialize)]
struct KeysReport {
    fingerprint: u32,
    farmer_key: String,
    addresses: Vec<String>,
}

async fn show_keys(args: cli::KeysArgs) -> Result<()> {
    let seed = seed_from_args(&args.seed)?;
    let wallet = Wallet::open(seed, &args.seed.passphrase, args.count)
        .await
        .context("failed to derive wallet keys")?;

    let report = KeysReport {
        fingerprint: wallet.fingerprint(),
        farmer_key: wallet.farmer_public_key().to_hex(),
        addresses: wallet.addresses().iter().map(Address::to_string).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn send(args: cli::SendArgs, network: &str, params: &ChainParams) -> Result<()> {
    let seed = seed_from_args(&args.seed)?;
    let to: Address = args.to.parse().context("invalid --to address")?;
    let currency = match &args.currency {
        Some(text) => text.parse().context("invalid --currency address")?,
        None => Address::ZERO,
    };
    let amount = Uint128::parse_literal(&args.amount).context("invalid --amount")?;

    let wallet = Wallet::open(seed, &args.seed.passphrase, args.addresses.max(1))
        .await
        .context("failed to derive wallet keys")?;

    let mut draft = Transaction::new(TxNote::Transfer);
    let output = draft.add_output(currency, to, amount);
    if let Some(memo) = args.memo {
        output.0.memo = Some(memo);
    }

    let mut options = TxOptions::builder()
        .network(network)
        .expires(args.expires)
        .fee_ratio(args.fee_ratio);
    if let Some(nonce) = args.nonce {
        options = options.nonce(nonce);
    }
    let options = options.build()?;

    let done = Completer::new(&wallet, params)
        .complete(draft, &options)
        .await
        .context("failed to complete transaction")?;
    tracing::info!(id = %done.transaction.id, fee = %done.fee_value, "transaction signed");

    if args.transport {
        println!("{}", done.transaction.to_transport()?);
    } else {
        println!("{}", done.transaction.to_json_pretty()?);
    }
    Ok(())
}

#[derive(Serialize)]
struct HashReport {
    id: String,
    content_hash: String,
    static_cost: u64,
    fee: u64,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn hash_document(input: &Path, params: &ChainParams) -> Result<()> {
    let tx = read_document(input)?;
    let verdict = verify_transaction(&tx, params);
    let static_cost = tx.calc_cost(params).context("failed to compute cost")?;

    let report = HashReport {
        id: tx.calc_hash(false)?.to_string(),
        content_hash: tx.calc_hash(true)?.to_string(),
        static_cost,
        fee: mmx_protocol::transaction::calc_fee(static_cost, tx.fee_ratio)?,
        valid: verdict.is_ok(),
        error: verdict.err().map(|e| e.to_string()),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_document(input: &Path) -> Result<Transaction> {
    let json = if input == Path::new("-") {
        read_stdin()?
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };
    Transaction::from_json(&json).context("failed to parse transaction document")
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
    Ok(text)
}
