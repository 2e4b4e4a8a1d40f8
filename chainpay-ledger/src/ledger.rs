//! Main ledger orchestration layer
//!
//! This module ties the identifier registry, balance book, transaction log,
//! and indices into the facade that owns all mutable state with exclusive
//! mutation rights.
//!
//! Every write path runs Validating → Mutating → Committed: validation
//! checks run in a fixed order so error precedence is deterministic, any
//! failure aborts with no state change, and a successful commit updates
//! balances, the log, and the indices together before publishing one event.
//!
//! # Example
//!
//! ```
//! use chainpay_ledger::{AccountId, Config, Ledger};
//!
//! fn main() -> chainpay_ledger::Result<()> {
//!     let mut ledger = Ledger::new(Config::default())?;
//!
//!     let operator = AccountId::new(1);
//!     ledger.register_with_id(operator);
//!     let alice = ledger.register_with_name(operator, "alice")?;
//!     let bob = ledger.register_with_name(operator, "bob")?;
//!
//!     ledger.credit(alice, 100)?;
//!     let receipt = ledger.create_transaction_auto(alice, bob, 40)?;
//!     assert_eq!(receipt.position, 0);
//!     assert_eq!(ledger.balance_of(bob), 40);
//!     Ok(())
//! }
//! ```

use crate::{
    balances::BalanceBook,
    chain::TransactionChain,
    index::TxIndex,
    metrics::Metrics,
    registry::IdentifierRegistry,
    storage::SnapshotStore,
    types::{AccountId, Amount, LedgerEvent, TransactionReceipt, TransactionView, TxId},
    Config, Error, Result,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::sync::broadcast;

/// Current wall-clock time as nanoseconds since the Unix epoch
pub(crate) fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(0)
}

/// The complete mutable state of the ledger
///
/// An explicitly owned aggregate: no ambient or static state anywhere. This
/// is also the snapshot unit persisted by [`SnapshotStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Account id and name registry
    pub registry: IdentifierRegistry,

    /// Per-account balances
    pub balances: BalanceBook,

    /// Hash-linked transaction log
    pub chain: TransactionChain,

    /// Per-account and per-transaction-id indices
    pub index: TxIndex,

    /// Next auto-allocated transaction id (strictly increasing, seeded at 1)
    pub next_auto_id: u128,
}

impl LedgerState {
    fn new() -> Self {
        Self {
            next_auto_id: 1,
            ..Self::default()
        }
    }
}

/// Main ledger interface
///
/// Designed for a single-writer execution model: all write operations take
/// `&mut self`, so validation and mutation of one write can never interleave
/// with another. For genuine parallelism, wrap it in the actor runtime
/// ([`crate::actor::spawn_ledger`]), which serializes writes through one task.
#[derive(Debug)]
pub struct Ledger {
    state: LedgerState,
    events: broadcast::Sender<LedgerEvent>,
    metrics: Metrics,
    config: Config,
}

impl Ledger {
    /// Create a fresh ledger without touching the snapshot store
    pub fn new(config: Config) -> Result<Self> {
        let metrics = Metrics::new()?;
        let (events, _) = broadcast::channel(config.channels.event_capacity.max(1));
        Ok(Self {
            state: LedgerState::new(),
            events,
            metrics,
            config,
        })
    }

    /// Open a ledger, loading a persisted snapshot if one exists
    pub fn open(config: Config) -> Result<Self> {
        let mut ledger = Self::new(config)?;

        if ledger.config.snapshot.enabled {
            let store = SnapshotStore::new(&ledger.config);
            if let Some(state) = store.load()? {
                tracing::info!(
                    accounts = state.registry.len(),
                    transactions = state.chain.len(),
                    "loaded ledger snapshot"
                );
                ledger.metrics.chain_length.set(state.chain.len() as i64);
                ledger.state = state;
            }
        }

        Ok(ledger)
    }

    // --- Write operations -------------------------------------------------

    /// Register an account under a display name, generating its id
    pub fn register_with_name(&mut self, caller: AccountId, name: &str) -> Result<AccountId> {
        let now = now_nanos();
        let id = self.state.registry.register_with_name(
            name,
            caller,
            now,
            self.config.registry.max_id_retries,
        )?;
        self.state.balances.open_account(id);

        self.metrics.record_account_created();
        tracing::info!(%id, name, "account registered");
        let _ = self.events.send(LedgerEvent::AccountCreated {
            id,
            name: Some(name.to_string()),
            timestamp_nanos: now,
        });
        Ok(id)
    }

    /// Register an account under a caller-supplied id
    ///
    /// Returns `false` (no-op, no event) if the id already exists.
    pub fn register_with_id(&mut self, id: AccountId) -> bool {
        if !self.state.registry.register_with_id(id) {
            return false;
        }
        self.state.balances.open_account(id);

        self.metrics.record_account_created();
        tracing::info!(%id, "account registered by id");
        let _ = self.events.send(LedgerEvent::AccountCreated {
            id,
            name: None,
            timestamp_nanos: now_nanos(),
        });
        true
    }

    /// Increase an account balance by a positive amount
    pub fn credit(&mut self, id: AccountId, amount: Amount) -> Result<Amount> {
        let new_balance = self.state.balances.credit(id, amount)?;
        self.emit_credited(id, amount, new_balance);
        Ok(new_balance)
    }

    /// Increase an account balance, accepting zero amounts
    pub fn deposit(&mut self, id: AccountId, amount: Amount) -> Result<Amount> {
        let new_balance = self.state.balances.deposit(id, amount)?;
        self.emit_credited(id, amount, new_balance);
        Ok(new_balance)
    }

    fn emit_credited(&self, id: AccountId, amount: Amount, new_balance: Amount) {
        tracing::debug!(%id, amount, new_balance, "balance credited");
        let _ = self.events.send(LedgerEvent::BalanceCredited {
            id,
            amount,
            new_balance,
            timestamp_nanos: now_nanos(),
        });
    }

    /// Decrease an account balance
    ///
    /// Returns `false` with no mutation if the amount is zero, the account is
    /// unknown, or the balance is insufficient.
    pub fn debit(&mut self, id: AccountId, amount: Amount) -> bool {
        if !self.state.balances.debit(id, amount) {
            return false;
        }
        let new_balance = self.state.balances.balance_of(id);
        tracing::debug!(%id, amount, new_balance, "balance debited");
        let _ = self.events.send(LedgerEvent::BalanceDebited {
            id,
            amount,
            new_balance,
            timestamp_nanos: now_nanos(),
        });
        true
    }

    /// Commit a transfer under a caller-supplied transaction id
    ///
    /// Validation order: sender exists, receiver exists, transaction id
    /// unused, amount positive and covered by the sender balance, receiver
    /// balance fits. Any failure aborts with no state change.
    pub fn create_transaction(
        &mut self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        transaction_id: TxId,
    ) -> Result<TransactionReceipt> {
        let started = Instant::now();
        let result = self.try_create_transaction(sender, receiver, amount, transaction_id, started);
        if let Err(ref err) = result {
            self.metrics.record_rejection();
            tracing::warn!(%sender, %receiver, amount, %transaction_id, %err, "transaction rejected");
        }
        result
    }

    fn try_create_transaction(
        &mut self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        transaction_id: TxId,
        started: Instant,
    ) -> Result<TransactionReceipt> {
        self.validate_parties(sender, receiver)?;
        if self.state.index.contains_transaction_id(transaction_id) {
            return Err(Error::DuplicateTransactionId(transaction_id));
        }
        self.validate_funds(sender, receiver, amount)?;
        self.commit_transfer(sender, receiver, amount, transaction_id, started)
    }

    /// Commit a transfer, allocating the next transaction id
    ///
    /// Identical validation minus the duplicate-id check; the id comes from a
    /// strictly increasing counter seeded at 1, skipping ids the manual path
    /// has already consumed.
    pub fn create_transaction_auto(
        &mut self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
    ) -> Result<TransactionReceipt> {
        let started = Instant::now();
        let result = self.try_create_transaction_auto(sender, receiver, amount, started);
        if let Err(ref err) = result {
            self.metrics.record_rejection();
            tracing::warn!(%sender, %receiver, amount, %err, "transaction rejected");
        }
        result
    }

    fn try_create_transaction_auto(
        &mut self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        started: Instant,
    ) -> Result<TransactionReceipt> {
        self.validate_parties(sender, receiver)?;
        self.validate_funds(sender, receiver, amount)?;

        // Allocate only after validation so rejected calls burn no ids.
        let mut candidate = self.state.next_auto_id;
        while self
            .state
            .index
            .contains_transaction_id(TxId::new(candidate))
        {
            candidate += 1;
        }
        let transaction_id = TxId::new(candidate);
        self.state.next_auto_id = candidate + 1;

        self.commit_transfer(sender, receiver, amount, transaction_id, started)
    }

    fn validate_parties(&self, sender: AccountId, receiver: AccountId) -> Result<()> {
        if !self.state.registry.exists(sender) {
            return Err(Error::UnknownAccount(sender));
        }
        if !self.state.registry.exists(receiver) {
            return Err(Error::UnknownAccount(receiver));
        }
        Ok(())
    }

    fn validate_funds(&self, sender: AccountId, receiver: AccountId, amount: Amount) -> Result<()> {
        let balance = self.state.balances.balance_of(sender);
        if amount == 0 || balance < amount {
            return Err(Error::InsufficientBalance {
                account: sender,
                balance,
                requested: amount,
            });
        }
        if sender != receiver
            && self
                .state
                .balances
                .balance_of(receiver)
                .checked_add(amount)
                .is_none()
        {
            return Err(Error::InvalidAmount(
                "receiver balance overflow".to_string(),
            ));
        }
        Ok(())
    }

    fn commit_transfer(
        &mut self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        transaction_id: TxId,
        started: Instant,
    ) -> Result<TransactionReceipt> {
        if !self.state.balances.transfer(sender, receiver, amount) {
            return Err(Error::InvariantViolation(
                "transfer refused after validation".to_string(),
            ));
        }

        let now = now_nanos();
        let position = self
            .state
            .chain
            .append(sender, receiver, amount, transaction_id, now);
        self.state
            .index
            .record_involvement(position, transaction_id, sender, receiver);

        let sender_balance = self.state.balances.balance_of(sender);
        let receiver_balance = self.state.balances.balance_of(receiver);

        self.metrics
            .record_transaction_committed(self.state.chain.len());
        self.metrics
            .record_commit_duration(started.elapsed().as_secs_f64());
        tracing::info!(
            %transaction_id, %sender, %receiver, amount, position,
            "transaction committed"
        );
        let _ = self.events.send(LedgerEvent::TransactionCreated {
            position,
            transaction_id,
            sender,
            receiver,
            amount,
            sender_balance,
            receiver_balance,
            timestamp_nanos: now,
        });

        Ok(TransactionReceipt {
            position,
            transaction_id,
            timestamp_nanos: now,
        })
    }

    // --- Read operations --------------------------------------------------

    /// Whether an account id is registered
    pub fn exists(&self, id: AccountId) -> bool {
        self.state.registry.exists(id)
    }

    /// Whether a display name is registered
    pub fn exists_by_name(&self, name: &str) -> bool {
        self.state.registry.exists_by_name(name)
    }

    /// Resolve a display name to its account id
    pub fn id_for_name(&self, name: &str) -> Result<AccountId> {
        self.state.registry.id_for_name(name)
    }

    /// Resolve an account id to its display name
    pub fn name_for_id(&self, id: AccountId) -> Result<String> {
        self.state.registry.name_for_id(id).map(str::to_string)
    }

    /// Current balance, zero for unknown accounts
    pub fn balance_of(&self, id: AccountId) -> Amount {
        self.state.balances.balance_of(id)
    }

    /// Number of committed transactions
    pub fn transaction_count(&self) -> u64 {
        self.state.chain.len()
    }

    /// Look up a committed transaction by id
    pub fn transaction_by_id(&self, transaction_id: TxId) -> Option<TransactionView> {
        let position = self.state.index.position_of(transaction_id)?;
        self.transaction_by_position(position)
    }

    /// Look up a committed transaction by log position
    pub fn transaction_by_position(&self, position: u64) -> Option<TransactionView> {
        self.state
            .chain
            .get(position)
            .map(|record| TransactionView::from_record(position, record))
    }

    /// All transactions involving an account, in chronological order
    pub fn transactions_for(&self, id: AccountId) -> Vec<TransactionView> {
        self.views_at(self.state.index.all_for(id))
    }

    /// Transactions sent by an account, in chronological order
    pub fn sent_by(&self, id: AccountId) -> Vec<TransactionView> {
        self.views_at(self.state.index.sent_for(id))
    }

    /// Transactions received by an account, in chronological order
    pub fn received_by(&self, id: AccountId) -> Vec<TransactionView> {
        self.views_at(self.state.index.received_for(id))
    }

    fn views_at(&self, positions: &[u64]) -> Vec<TransactionView> {
        positions
            .iter()
            .filter_map(|&p| self.transaction_by_position(p))
            .collect()
    }

    /// Sum of all account balances
    pub fn total_balance(&self) -> Amount {
        self.state.balances.total()
    }

    /// Re-derive and verify the whole hash chain
    pub fn verify_chain(&self) -> Result<()> {
        self.state.chain.verify()
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Full ledger state (audit and snapshot use)
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Persist the current state to the snapshot store
    pub fn save_snapshot(&self) -> Result<()> {
        SnapshotStore::new(&self.config).save(&self.state)
    }
}
