//! # CLI Interface
//!
//! Defines the command-line argument structure for `mmx-wallet` using
//! `clap` derive.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// MMX wallet engine.
///
/// Derives wallet keys, builds and signs transactions, and converts them
/// between JSON and the compressed transport form. Nothing here talks to a
/// node: output goes to stdout, logs to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "mmx-wallet",
    about = "MMX wallet: keys, transactions, transport packing",
    version,
    propagate_version = true
)]
pub struct MmxWalletCli {
    /// Network name. Selects the built-in chain parameters unless
    /// `--params` is given.
    #[arg(long, global = true, env = "MMX_NETWORK", default_value = "mainnet")]
    pub network: String,

    /// Chain parameters as a JSON file.
    #[arg(long, global = true, env = "MMX_PARAMS")]
    pub params: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, env = "MMX_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh random seed and print it with its mnemonic.
    NewSeed,
    /// Show the fingerprint, addresses and farmer key of a wallet.
    Keys(KeysArgs),
    /// Build, fund and sign a transfer.
    Send(SendArgs),
    /// Recompute a transaction's hashes and cost and verify it.
    Hash(DocumentArgs),
    /// Convert a transaction JSON document to the transport form.
    Pack(DocumentArgs),
    /// Convert transport text back to a pretty-printed JSON document.
    Unpack(UnpackArgs),
}

/// Where the wallet seed comes from.
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Seed as 64 hex characters.
    ///
    /// **Visible in shell history and process lists.** Prefer `--mnemonic`
    /// from a file or a prompt wrapper for anything real.
    #[arg(long, conflicts_with = "mnemonic", required_unless_present = "mnemonic")]
    pub seed: Option<String>,

    /// Seed as a 24-word mnemonic.
    #[arg(long)]
    pub mnemonic: Option<String>,

    /// Wallet passphrase.
    #[arg(long, env = "MMX_PASSPHRASE", default_value = "", hide_env_values = true)]
    pub passphrase: String,
}

/// Arguments for the `keys` subcommand.
#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// Number of addresses to derive.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: u32,
}

/// Arguments for the `send` subcommand.
#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub seed: SeedArgs,

    /// Destination address.
    #[arg(long)]
    pub to: String,

    /// Amount in raw units (decimal or 0x-hex).
    #[arg(long)]
    pub amount: String,

    /// Currency address; the native coin when omitted.
    #[arg(long)]
    pub currency: Option<String>,

    /// Memo attached to the output (at most 64 bytes).
    #[arg(long)]
    pub memo: Option<String>,

    /// Height after which the transaction is invalid.
    #[arg(long)]
    pub expires: u32,

    /// Fee ratio in 1024ths; raised to the chain minimum.
    #[arg(long, default_value_t = 1024)]
    pub fee_ratio: u32,

    /// Fixed nonce instead of a random one.
    #[arg(long)]
    pub nonce: Option<u64>,

    /// Number of wallet addresses to derive (owners beyond index 0).
    #[arg(long, default_value_t = 1)]
    pub addresses: u32,

    /// Print the transport form instead of JSON.
    #[arg(long)]
    pub transport: bool,
}

/// A transaction document from a file or stdin.
#[derive(Args, Debug)]
pub struct DocumentArgs {
    /// Path to the JSON document, `-` for stdin.
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

/// Arguments for the `unpack` subcommand.
#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Transport text, or `-` to read it from stdin.
    #[arg(default_value = "-")]
    pub text: String,
}
