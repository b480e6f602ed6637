//! Transaction completion: from a draft to a signed, finalized transaction.
//!
//! A draft says *what* should happen (outputs, operations, maybe a deploy).
//! The [`Completer`] works out *how it is paid for*:
//!
//! 1. Stamp `expires`, `network` and a random non-zero `nonce`.
//! 2. Raise `fee_ratio` to the chain minimum.
//! 3. Sum what is owed per currency: outputs plus deposits, minus inputs
//!    already present, plus pre-funded deposits from [`TxOptions`].
//! 4. Synthesize one input per owed currency from the wallet's primary
//!    address. The native input also carries the fee, so for wallet-funded
//!    transactions `inputs - outputs - deposits == fee`.
//! 5. Price the transaction including the signatures still to come, set
//!    `max_fee_amount`, sign, recompute `static_cost` and finalize.
//!
//! The draft is taken by value. On any error nothing is returned, so a
//! half-completed transaction cannot escape.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use super::cost::{calc_fee, checked_add, checked_mul};
use super::error::TransactionError;
use super::signing::{apply_plan, resolve_owners, OwnerOverrides, SigningPlan};
use super::tx::Transaction;
use super::types::{TxIn, TxNote};
use crate::config::DEFAULT_GAS_LIMIT;
use crate::crypto::{LocalSigner, SigningProvider};
use crate::params::ChainParams;
use crate::types::{Address, Uint128};
use crate::vault::Wallet;

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// A snapshot of what each address can spend, per currency.
///
/// The builder performs no I/O. Callers that know balances pass them in and
/// get [`TransactionError::InsufficientFunds`] instead of a transaction the
/// node would reject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendableBalances {
    entries: HashMap<(Address, Address), Uint128>,
}

impl SpendableBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the spendable `amount` of `currency` held by `address`.
    pub fn insert(&mut self, address: Address, currency: Address, amount: Uint128) {
        self.entries.insert((address, currency), amount);
    }

    pub fn with(mut self, address: Address, currency: Address, amount: Uint128) -> Self {
        self.insert(address, currency, amount);
        self
    }

    /// Zero when unknown.
    pub fn available(&self, address: &Address, currency: &Address) -> Uint128 {
        self.entries
            .get(&(*address, *currency))
            .copied()
            .unwrap_or(Uint128::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Validated build options. Create with [`TxOptions::builder`].
#[derive(Debug, Clone)]
pub struct TxOptions {
    pub network: String,
    pub expires: u32,
    pub fee_ratio: u32,
    pub gas_limit: u64,
    pub nonce: Option<u64>,
    pub note: Option<TxNote>,
    pub sender: Option<Address>,
    pub owners: OwnerOverrides,
    pub deposits: BTreeMap<Address, Uint128>,
    pub balances: Option<SpendableBalances>,
}

impl TxOptions {
    pub fn builder() -> TxOptionsBuilder {
        TxOptionsBuilder::default()
    }
}

/// Fluent builder for [`TxOptions`].
///
/// ```
/// use mmx_protocol::transaction::TxOptions;
///
/// let options = TxOptions::builder()
///     .network("mainnet")
///     .expires(1_000_000)
///     .fee_ratio(2048)
///     .build()
///     .unwrap();
/// assert_eq!(options.fee_ratio, 2048);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TxOptionsBuilder {
    network: Option<String>,
    expires: Option<u32>,
    fee_ratio: Option<u32>,
    gas_limit: Option<u64>,
    nonce: Option<u64>,
    note: Option<TxNote>,
    sender: Option<Address>,
    owners: OwnerOverrides,
    deposits: Vec<(Address, Uint128)>,
    balances: Option<SpendableBalances>,
}

impl TxOptionsBuilder {
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Height after which the transaction is invalid.
    pub fn expires(mut self, height: u32) -> Self {
        self.expires = Some(height);
        self
    }

    /// Requested fee ratio in 1024ths. Raised to the chain minimum if lower.
    pub fn fee_ratio(mut self, ratio: u32) -> Self {
        self.fee_ratio = Some(ratio);
        self
    }

    pub fn gas_limit(mut self, gas: u64) -> Self {
        self.gas_limit = Some(gas);
        self
    }

    /// Fixed nonce; a random one is drawn when unset or zero.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn note(mut self, note: TxNote) -> Self {
        self.note = Some(note);
        self
    }

    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    /// `owner` signs for inputs and calls made by `contract`.
    pub fn owner(mut self, contract: Address, owner: Address) -> Self {
        self.owners.insert(contract, owner);
        self
    }

    /// Funds deposited outside the draft's own operations. Repeated
    /// currencies accumulate; `build()` fails if a total overflows.
    pub fn deposit(mut self, currency: Address, amount: Uint128) -> Self {
        self.deposits.push((currency, amount));
        self
    }

    pub fn balances(mut self, balances: SpendableBalances) -> Self {
        self.balances = Some(balances);
        self
    }

    pub fn build(self) -> Result<TxOptions, TransactionError> {
        let network = self
            .network
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TransactionError::Configuration("network is required".into()))?;
        let expires = self
            .expires
            .ok_or_else(|| TransactionError::Configuration("expires is required".into()))?;

        let mut deposits = BTreeMap::new();
        for (currency, amount) in self.deposits {
            let total: &mut Uint128 = deposits.entry(currency).or_insert(Uint128::ZERO);
            *total = total
                .checked_add(amount)
                .ok_or(TransactionError::Overflow("prefunded deposit"))?;
        }

        Ok(TxOptions {
            network,
            expires,
            fee_ratio: self.fee_ratio.unwrap_or(0),
            gas_limit: self.gas_limit.unwrap_or(DEFAULT_GAS_LIMIT),
            nonce: self.nonce,
            note: self.note,
            sender: self.sender,
            owners: self.owners,
            deposits,
            balances: self.balances,
        })
    }
}

// ---------------------------------------------------------------------------
// Completer
// ---------------------------------------------------------------------------

/// A signed, finalized transaction plus its fee for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTx {
    pub transaction: Transaction,
    /// Static fee in raw native units.
    pub fee_amount: u64,
    /// `fee_amount` as a decimal string using the chain's decimals.
    pub fee_value: String,
}

/// Completes drafts against one wallet and one parameter set.
pub struct Completer<'a> {
    wallet: &'a Wallet,
    params: &'a ChainParams,
    signer: Arc<dyn SigningProvider>,
}

impl<'a> Completer<'a> {
    pub fn new(wallet: &'a Wallet, params: &'a ChainParams) -> Self {
        Self {
            wallet,
            params,
            signer: Arc::new(LocalSigner),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn SigningProvider>) -> Self {
        self.signer = signer;
        self
    }

    pub async fn complete(
        &self,
        draft: Transaction,
        options: &TxOptions,
    ) -> Result<CompletedTx, TransactionError> {
        let params = self.params;
        let funder = self.wallet.primary_address();
        let mut tx = draft;

        tx.expires = options.expires;
        tx.network = options.network.clone();
        if let Some(note) = options.note {
            tx.note = note;
        }
        if let Some(nonce) = options.nonce {
            tx.nonce = nonce;
        }
        if tx.nonce == 0 {
            tx.nonce = random_nonce();
        }
        tx.fee_ratio = options.fee_ratio.max(params.min_fee_ratio);
        tx.validate_memos()?;

        let mut missing = owed_amounts(&tx, &options.deposits)?;
        let native_owed = missing.remove(&Address::ZERO).unwrap_or(0);
        debug!(
            currencies = missing.len() + 1,
            native = native_owed,
            "resolved owed amounts"
        );

        for (currency, amount) in &missing {
            tx.add_input(*currency, funder, Uint128::from(*amount));
        }
        let native_index = tx.inputs.len();
        tx.inputs.push(TxIn::new(funder, Address::ZERO, Uint128::ZERO));

        tx.sender = options.sender.or(tx.sender).or(Some(funder));

        let (mut plan, mut static_cost) = self.estimate(&tx, options)?;
        let fee = calc_fee(static_cost, tx.fee_ratio)?;
        let native_total = native_owed
            .checked_add(fee as u128)
            .ok_or(TransactionError::Overflow("native input"))?;
        if native_total == 0 {
            tx.inputs.remove(native_index);
            (plan, static_cost) = self.estimate(&tx, options)?;
        } else {
            tx.inputs[native_index].io.amount = Uint128::from(native_total);
            missing.insert(Address::ZERO, native_total);
        }
        debug!(static_cost, fee, solutions = plan.new_solutions(), "priced");

        if let Some(balances) = &options.balances {
            check_balances(balances, &funder, &missing)?;
        }
        if static_cost > params.max_tx_cost {
            return Err(TransactionError::CostTooHigh {
                cost: static_cost,
                max: params.max_tx_cost,
            });
        }

        let max_cost = checked_add(static_cost, options.gas_limit, "max fee")?;
        tx.max_fee_amount = calc_fee(max_cost, tx.fee_ratio)?;
        tx.static_cost = static_cost;

        apply_plan(&mut tx, &plan, self.wallet, self.signer.as_ref()).await?;

        let actual = tx.calc_cost(params)?;
        if actual != static_cost {
            return Err(TransactionError::CostMismatch {
                expected: static_cost,
                actual,
            });
        }
        tx.finalize()?;

        info!(
            id = %tx.id,
            fee,
            inputs = tx.inputs.len(),
            outputs = tx.outputs.len(),
            solutions = tx.solutions.len(),
            "transaction completed"
        );
        Ok(CompletedTx {
            transaction: tx,
            fee_amount: fee,
            fee_value: params.format_amount(Uint128::from(fee)),
        })
    }

    /// Signing plan plus the static cost once that plan is signed.
    fn estimate(
        &self,
        tx: &Transaction,
        options: &TxOptions,
    ) -> Result<(SigningPlan, u64), TransactionError> {
        let plan = resolve_owners(tx, &options.owners)?;
        let signatures = checked_mul(
            plan.new_solutions() as u64,
            self.params.min_txfee_sign,
            "solution cost",
        )?;
        let cost = checked_add(tx.calc_cost(self.params)?, signatures, "static cost")?;
        Ok((plan, cost))
    }
}

fn random_nonce() -> u64 {
    loop {
        let nonce = rand::random::<u64>();
        if nonce != 0 {
            return nonce;
        }
    }
}

/// Outputs and deposits, minus existing inputs, plus pre-funded deposits.
fn owed_amounts(
    tx: &Transaction,
    prefunded: &BTreeMap<Address, Uint128>,
) -> Result<BTreeMap<Address, u128>, TransactionError> {
    fn add(
        map: &mut BTreeMap<Address, u128>,
        currency: Address,
        amount: Uint128,
    ) -> Result<(), TransactionError> {
        let entry = map.entry(currency).or_insert(0);
        *entry = entry
            .checked_add(amount.to_u128())
            .ok_or(TransactionError::Overflow("owed amount"))?;
        Ok(())
    }

    let mut owed = BTreeMap::new();
    for output in &tx.outputs {
        add(&mut owed, output.contract, output.amount)?;
    }
    for (currency, amount) in tx.execute.iter().filter_map(|op| op.deposit()) {
        add(&mut owed, currency, amount)?;
    }
    for input in &tx.inputs {
        if let Some(entry) = owed.get_mut(&input.contract) {
            *entry = entry.saturating_sub(input.amount.to_u128());
        }
    }
    for (currency, amount) in prefunded {
        add(&mut owed, *currency, *amount)?;
    }
    owed.retain(|_, amount| *amount > 0);
    Ok(owed)
}

fn check_balances(
    balances: &SpendableBalances,
    funder: &Address,
    required: &BTreeMap<Address, u128>,
) -> Result<(), TransactionError> {
    for (currency, amount) in required {
        let available = balances.available(funder, currency);
        if available.to_u128() < *amount {
            return Err(TransactionError::InsufficientFunds {
                currency: *currency,
                required: Uint128::from(*amount),
                available,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Seed;
    use crate::transaction::operation::{Deposit, Execute};

    const TOKEN: Address = Address::new([0x42; 32]);
    const DEST: Address = Address::new([0x07; 32]);

    fn wallet() -> Wallet {
        Wallet::open_blocking(&Seed::new([0u8; 32]), "", 2).unwrap()
    }

    fn options() -> TxOptionsBuilder {
        TxOptions::builder().network("mainnet").expires(100_000)
    }

    fn native_balance(tx: &Transaction) -> i128 {
        let ins = tx.input_total(&Address::ZERO).unwrap().to_u128() as i128;
        let outs = tx.output_total(&Address::ZERO).unwrap().to_u128() as i128;
        let deps = tx.deposit_total(&Address::ZERO).unwrap().to_u128() as i128;
        ins - outs - deps
    }

    #[tokio::test]
    async fn native_transfer_pays_output_plus_fee() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let mut draft = Transaction::new(TxNote::Transfer);
        draft.add_output(Address::ZERO, DEST, Uint128::from(1_000_000u64));

        let done = Completer::new(&w, &params)
            .complete(draft, &options().build().unwrap())
            .await
            .unwrap();
        let tx = &done.transaction;

        // base + two I/O entries + one signature
        assert_eq!(tx.static_cost, 100 + 200 + 1000);
        assert_eq!(done.fee_amount, 1300);
        assert_eq!(done.fee_value, "0.0013");
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.inputs[0].address, w.primary_address());
        assert_eq!(native_balance(tx), done.fee_amount as i128);
        assert_eq!(tx.sender, Some(w.primary_address()));
        assert_ne!(tx.nonce, 0);
        assert!(tx.is_finalized());
        assert!(tx.solutions[0].verify(&tx.id));
    }

    #[tokio::test]
    async fn token_transfer_adds_native_fee_input() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let mut draft = Transaction::new(TxNote::Transfer);
        draft.add_output(TOKEN, DEST, Uint128::from(5u64));

        let done = Completer::new(&w, &params)
            .complete(draft, &options().build().unwrap())
            .await
            .unwrap();
        let tx = &done.transaction;

        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.input_total(&TOKEN).unwrap(), Uint128::from(5u64));
        assert_eq!(native_balance(tx), done.fee_amount as i128);
        // One owner, one solution.
        assert_eq!(tx.solutions.len(), 1);
        assert!(tx.inputs.iter().all(|i| i.solution == 0));
    }

    #[tokio::test]
    async fn existing_inputs_reduce_the_shortfall() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let mut draft = Transaction::new(TxNote::Transfer);
        draft.add_input(TOKEN, w.address(1).unwrap(), Uint128::from(3u64));
        draft.add_output(TOKEN, DEST, Uint128::from(5u64));

        let done = Completer::new(&w, &params)
            .complete(draft, &options().build().unwrap())
            .await
            .unwrap();
        let tx = &done.transaction;
        assert_eq!(tx.input_total(&TOKEN).unwrap(), Uint128::from(5u64));
        assert_eq!(tx.solutions.len(), 2);
    }

    #[tokio::test]
    async fn fee_ratio_is_raised_to_minimum_and_bounds_max_fee() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let mut draft = Transaction::new(TxNote::Transfer);
        draft.add_output(Address::ZERO, DEST, Uint128::from(1u64));

        let opts = options().fee_ratio(10).gas_limit(1000).build().unwrap();
        let done = Completer::new(&w, &params).complete(draft, &opts).await.unwrap();
        let tx = &done.transaction;
        assert_eq!(tx.fee_ratio, params.min_fee_ratio);
        assert_eq!(
            tx.max_fee_amount,
            calc_fee(tx.static_cost + 1000, tx.fee_ratio).unwrap()
        );
    }

    #[tokio::test]
    async fn deposits_and_prefunded_amounts_are_owed() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let mut draft = Transaction::new(TxNote::Deposit);
        let call = Execute::new(Address::new([9; 32]), "deposit", vec![])
            .with_user(w.primary_address());
        draft
            .execute
            .push(Deposit::new(call, TOKEN, Uint128::from(10u64)).into());

        let opts = options().deposit(TOKEN, Uint128::from(4u64)).build().unwrap();
        let done = Completer::new(&w, &params).complete(draft, &opts).await.unwrap();
        let tx = &done.transaction;
        assert_eq!(tx.input_total(&TOKEN).unwrap(), Uint128::from(14u64));
        assert_eq!(tx.execute[0].solution(), 0);
    }

    #[test]
    fn prefunded_deposits_accumulate_per_currency() {
        let opts = options()
            .deposit(TOKEN, Uint128::from(4u64))
            .deposit(TOKEN, Uint128::from(6u64))
            .deposit(Address::ZERO, Uint128::from(1u64))
            .build()
            .unwrap();
        assert_eq!(opts.deposits[&TOKEN], Uint128::from(10u64));
        assert_eq!(opts.deposits[&Address::ZERO], Uint128::from(1u64));
    }

    #[test]
    fn overflowing_prefunded_deposit_fails_build() {
        let err = options()
            .deposit(TOKEN, Uint128::MAX)
            .deposit(TOKEN, Uint128::MAX)
            .build()
            .unwrap_err();
        assert_eq!(err, TransactionError::Overflow("prefunded deposit"));
        assert!(err.is_overflow());

        // A single maximal deposit is still representable.
        let opts = options().deposit(TOKEN, Uint128::MAX).build().unwrap();
        assert_eq!(opts.deposits[&TOKEN], Uint128::MAX);
    }

    #[tokio::test]
    async fn fixed_nonce_is_kept() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let draft = Transaction::new(TxNote::Transfer);
        let opts = options().nonce(77).build().unwrap();
        let done = Completer::new(&w, &params).complete(draft, &opts).await.unwrap();
        assert_eq!(done.transaction.nonce, 77);
    }

    #[tokio::test]
    async fn insufficient_funds_are_reported() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let mut draft = Transaction::new(TxNote::Transfer);
        draft.add_output(TOKEN, DEST, Uint128::from(50u64));

        let balances = SpendableBalances::new()
            .with(w.primary_address(), TOKEN, Uint128::from(20u64))
            .with(w.primary_address(), Address::ZERO, Uint128::from(1_000_000u64));
        let opts = options().balances(balances).build().unwrap();
        let err = Completer::new(&w, &params)
            .complete(draft, &opts)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransactionError::InsufficientFunds {
                currency: TOKEN,
                required: Uint128::from(50u64),
                available: Uint128::from(20u64),
            }
        );
    }

    #[tokio::test]
    async fn long_memo_aborts_the_build() {
        let w = wallet();
        let params = ChainParams::mainnet();
        let mut draft = Transaction::new(TxNote::Transfer);
        let out = draft.add_output(Address::ZERO, DEST, Uint128::from(1u64));
        out.0.memo = Some("m".repeat(65));

        let err = Completer::new(&w, &params)
            .complete(draft, &options().build().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::MemoTooLong { len: 65, .. }));
    }

    #[test]
    fn options_require_network_and_expiry() {
        let err = TxOptions::builder().expires(1).build().unwrap_err();
        assert!(err.is_configuration());
        let err = TxOptions::builder().network("").expires(1).build().unwrap_err();
        assert!(err.is_configuration());
        let err = TxOptions::builder().network("mainnet").build().unwrap_err();
        assert!(err.is_configuration());

        let opts = options().build().unwrap();
        assert_eq!(opts.gas_limit, DEFAULT_GAS_LIMIT);
    }
}
