//! # Transaction Module
//!
//! The MMX transaction model, its canonical hashes, the cost model, and
//! everything the wallet does to turn a draft into something a node accepts.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        - TxNote, TxIo, TxIn, TxOut
//! operation.rs    - Execute and Deposit contract calls
//! solution.rs     - PubKey solutions (pubkey + signature)
//! contract.rs     - Executable deploy payload
//! result.rs       - ExecutionResult attached by the node
//! tx.rs           - Transaction, two-mode hashing, JSON and transport forms
//! cost.rs         - static cost and fee
//! signing.rs      - owner resolution and solution assignment
//! builder.rs      - TxOptions and the Completer
//! verification.rs - shape checks before submission
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Draft** - outputs, operations, maybe a deploy.
//! 2. **Complete** - [`Completer::complete`] funds, prices and signs it.
//! 3. **Verify** - [`verify_transaction`] checks hashes, signatures and cost.
//! 4. **Hand off** - as JSON or the compressed transport form.
//!
//! ## Two Hashes
//!
//! `id` leaves out everything a signature depends on (solutions, solution
//! indices, flags, static cost) so it can be signed. `content_hash` covers
//! all of it. Both are recomputed whenever they matter.

pub mod builder;
pub mod contract;
pub mod cost;
pub mod error;
pub mod operation;
pub mod result;
pub mod signing;
pub mod solution;
pub mod tx;
pub mod types;
pub mod verification;

pub use builder::{CompletedTx, Completer, SpendableBalances, TxOptions, TxOptionsBuilder};
pub use contract::Executable;
pub use cost::calc_fee;
pub use error::TransactionError;
pub use operation::{Deposit, Execute, Operation};
pub use result::{ExecError, ExecutionResult};
pub use signing::{resolve_owners, sign_transaction, OwnerOverrides, SigningPlan};
pub use solution::Solution;
pub use tx::Transaction;
pub use types::{TxIn, TxIo, TxNote, TxOut};
pub use verification::{verify_transaction, verify_transaction_with_owners};
