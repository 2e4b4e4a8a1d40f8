//! Actor-based concurrency for the ledger
//!
//! The core is single-writer by design: the actor task owns the [`Ledger`]
//! outright and processes one message at a time, so every write's
//! validate-then-mutate sequence is a critical section and reads only ever
//! observe committed state. A cloneable [`LedgerHandle`] sends typed messages
//! over a bounded mailbox and awaits oneshot replies.

use crate::{
    types::{AccountId, Amount, LedgerEvent, TransactionReceipt, TransactionView, TxId},
    Error, Ledger, Result,
};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Register an account under a display name
    RegisterWithName {
        /// Caller identity (salts id derivation)
        caller: AccountId,
        /// Display name
        name: String,
        /// Reply channel
        response: oneshot::Sender<Result<AccountId>>,
    },

    /// Register an account under a caller-supplied id
    RegisterWithId {
        /// Requested id
        id: AccountId,
        /// Reply channel
        response: oneshot::Sender<bool>,
    },

    /// Credit a balance (positive amounts only)
    Credit {
        /// Account
        id: AccountId,
        /// Amount
        amount: Amount,
        /// Reply channel
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Deposit into a balance (zero allowed)
    Deposit {
        /// Account
        id: AccountId,
        /// Amount
        amount: Amount,
        /// Reply channel
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Debit a balance
    Debit {
        /// Account
        id: AccountId,
        /// Amount
        amount: Amount,
        /// Reply channel
        response: oneshot::Sender<bool>,
    },

    /// Commit a transfer under a caller-supplied transaction id
    CreateTransaction {
        /// Debited account
        sender: AccountId,
        /// Credited account
        receiver: AccountId,
        /// Amount
        amount: Amount,
        /// Caller-supplied transaction id
        transaction_id: TxId,
        /// Reply channel
        response: oneshot::Sender<Result<TransactionReceipt>>,
    },

    /// Commit a transfer with an auto-allocated transaction id
    CreateTransactionAuto {
        /// Debited account
        sender: AccountId,
        /// Credited account
        receiver: AccountId,
        /// Amount
        amount: Amount,
        /// Reply channel
        response: oneshot::Sender<Result<TransactionReceipt>>,
    },

    /// Whether an account exists
    Exists {
        /// Account
        id: AccountId,
        /// Reply channel
        response: oneshot::Sender<bool>,
    },

    /// Resolve a display name to an account id
    IdForName {
        /// Display name
        name: String,
        /// Reply channel
        response: oneshot::Sender<Result<AccountId>>,
    },

    /// Resolve an account id to its display name
    NameForId {
        /// Account
        id: AccountId,
        /// Reply channel
        response: oneshot::Sender<Result<String>>,
    },

    /// Current balance
    BalanceOf {
        /// Account
        id: AccountId,
        /// Reply channel
        response: oneshot::Sender<Amount>,
    },

    /// Number of committed transactions
    TransactionCount {
        /// Reply channel
        response: oneshot::Sender<u64>,
    },

    /// Look up a transaction by id
    TransactionById {
        /// Transaction id
        transaction_id: TxId,
        /// Reply channel
        response: oneshot::Sender<Option<TransactionView>>,
    },

    /// Look up a transaction by log position
    TransactionByPosition {
        /// Log position
        position: u64,
        /// Reply channel
        response: oneshot::Sender<Option<TransactionView>>,
    },

    /// All transactions involving an account
    TransactionsFor {
        /// Account
        id: AccountId,
        /// Reply channel
        response: oneshot::Sender<Vec<TransactionView>>,
    },

    /// Transactions sent by an account
    SentBy {
        /// Account
        id: AccountId,
        /// Reply channel
        response: oneshot::Sender<Vec<TransactionView>>,
    },

    /// Transactions received by an account
    ReceivedBy {
        /// Account
        id: AccountId,
        /// Reply channel
        response: oneshot::Sender<Vec<TransactionView>>,
    },

    /// Verify the hash chain end to end
    VerifyChain {
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Subscribe to the event stream
    Subscribe {
        /// Reply channel
        response: oneshot::Sender<broadcast::Receiver<LedgerEvent>>,
    },

    /// Persist a snapshot now
    SaveSnapshot {
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Shutdown actor (persists a snapshot if configured)
    Shutdown {
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },
}

/// Actor that owns the ledger and processes messages sequentially
pub struct LedgerActor {
    ledger: Ledger,
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: Ledger, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { ledger, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown { response } => {
                    let result = if self.ledger.config().snapshot.save_on_shutdown {
                        self.ledger.save_snapshot()
                    } else {
                        Ok(())
                    };
                    let _ = response.send(result);
                    break;
                }
                other => self.handle_message(other),
            }
        }
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::RegisterWithName {
                caller,
                name,
                response,
            } => {
                let _ = response.send(self.ledger.register_with_name(caller, &name));
            }
            LedgerMessage::RegisterWithId { id, response } => {
                let _ = response.send(self.ledger.register_with_id(id));
            }
            LedgerMessage::Credit {
                id,
                amount,
                response,
            } => {
                let _ = response.send(self.ledger.credit(id, amount));
            }
            LedgerMessage::Deposit {
                id,
                amount,
                response,
            } => {
                let _ = response.send(self.ledger.deposit(id, amount));
            }
            LedgerMessage::Debit {
                id,
                amount,
                response,
            } => {
                let _ = response.send(self.ledger.debit(id, amount));
            }
            LedgerMessage::CreateTransaction {
                sender,
                receiver,
                amount,
                transaction_id,
                response,
            } => {
                let _ = response.send(
                    self.ledger
                        .create_transaction(sender, receiver, amount, transaction_id),
                );
            }
            LedgerMessage::CreateTransactionAuto {
                sender,
                receiver,
                amount,
                response,
            } => {
                let _ = response.send(self.ledger.create_transaction_auto(sender, receiver, amount));
            }
            LedgerMessage::Exists { id, response } => {
                let _ = response.send(self.ledger.exists(id));
            }
            LedgerMessage::IdForName { name, response } => {
                let _ = response.send(self.ledger.id_for_name(&name));
            }
            LedgerMessage::NameForId { id, response } => {
                let _ = response.send(self.ledger.name_for_id(id));
            }
            LedgerMessage::BalanceOf { id, response } => {
                let _ = response.send(self.ledger.balance_of(id));
            }
            LedgerMessage::TransactionCount { response } => {
                let _ = response.send(self.ledger.transaction_count());
            }
            LedgerMessage::TransactionById {
                transaction_id,
                response,
            } => {
                let _ = response.send(self.ledger.transaction_by_id(transaction_id));
            }
            LedgerMessage::TransactionByPosition { position, response } => {
                let _ = response.send(self.ledger.transaction_by_position(position));
            }
            LedgerMessage::TransactionsFor { id, response } => {
                let _ = response.send(self.ledger.transactions_for(id));
            }
            LedgerMessage::SentBy { id, response } => {
                let _ = response.send(self.ledger.sent_by(id));
            }
            LedgerMessage::ReceivedBy { id, response } => {
                let _ = response.send(self.ledger.received_by(id));
            }
            LedgerMessage::VerifyChain { response } => {
                let _ = response.send(self.ledger.verify_chain());
            }
            LedgerMessage::Subscribe { response } => {
                let _ = response.send(self.ledger.subscribe());
            }
            LedgerMessage::SaveSnapshot { response } => {
                let _ = response.send(self.ledger.save_snapshot());
            }
            LedgerMessage::Shutdown { .. } => {
                // Handled in the main loop.
            }
        }
    }
}

macro_rules! request {
    ($self:expr, $variant:ident { $($field:ident : $value:expr),* $(,)? }) => {{
        let (tx, rx) = oneshot::channel();
        $self
            .sender
            .send(LedgerMessage::$variant {
                $($field: $value,)*
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }};
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    /// Register an account under a display name
    pub async fn register_with_name(&self, caller: AccountId, name: &str) -> Result<AccountId> {
        request!(self, RegisterWithName { caller: caller, name: name.to_string() })?
    }

    /// Register an account under a caller-supplied id
    pub async fn register_with_id(&self, id: AccountId) -> Result<bool> {
        request!(self, RegisterWithId { id: id })
    }

    /// Credit a balance
    pub async fn credit(&self, id: AccountId, amount: Amount) -> Result<Amount> {
        request!(self, Credit { id: id, amount: amount })?
    }

    /// Deposit into a balance
    pub async fn deposit(&self, id: AccountId, amount: Amount) -> Result<Amount> {
        request!(self, Deposit { id: id, amount: amount })?
    }

    /// Debit a balance
    pub async fn debit(&self, id: AccountId, amount: Amount) -> Result<bool> {
        request!(self, Debit { id: id, amount: amount })
    }

    /// Commit a transfer under a caller-supplied transaction id
    pub async fn create_transaction(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        transaction_id: TxId,
    ) -> Result<TransactionReceipt> {
        request!(self, CreateTransaction {
            sender: sender,
            receiver: receiver,
            amount: amount,
            transaction_id: transaction_id,
        })?
    }

    /// Commit a transfer with an auto-allocated transaction id
    pub async fn create_transaction_auto(
        &self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
    ) -> Result<TransactionReceipt> {
        request!(self, CreateTransactionAuto {
            sender: sender,
            receiver: receiver,
            amount: amount,
        })?
    }

    /// Whether an account exists
    pub async fn exists(&self, id: AccountId) -> Result<bool> {
        request!(self, Exists { id: id })
    }

    /// Resolve a display name to an account id
    pub async fn id_for_name(&self, name: &str) -> Result<AccountId> {
        request!(self, IdForName { name: name.to_string() })?
    }

    /// Resolve an account id to its display name
    pub async fn name_for_id(&self, id: AccountId) -> Result<String> {
        request!(self, NameForId { id: id })?
    }

    /// Current balance
    pub async fn balance_of(&self, id: AccountId) -> Result<Amount> {
        request!(self, BalanceOf { id: id })
    }

    /// Number of committed transactions
    pub async fn transaction_count(&self) -> Result<u64> {
        request!(self, TransactionCount {})
    }

    /// Look up a transaction by id
    pub async fn transaction_by_id(&self, transaction_id: TxId) -> Result<Option<TransactionView>> {
        request!(self, TransactionById { transaction_id: transaction_id })
    }

    /// Look up a transaction by log position
    pub async fn transaction_by_position(&self, position: u64) -> Result<Option<TransactionView>> {
        request!(self, TransactionByPosition { position: position })
    }

    /// All transactions involving an account
    pub async fn transactions_for(&self, id: AccountId) -> Result<Vec<TransactionView>> {
        request!(self, TransactionsFor { id: id })
    }

    /// Transactions sent by an account
    pub async fn sent_by(&self, id: AccountId) -> Result<Vec<TransactionView>> {
        request!(self, SentBy { id: id })
    }

    /// Transactions received by an account
    pub async fn received_by(&self, id: AccountId) -> Result<Vec<TransactionView>> {
        request!(self, ReceivedBy { id: id })
    }

    /// Verify the hash chain end to end
    pub async fn verify_chain(&self) -> Result<()> {
        request!(self, VerifyChain {})?
    }

    /// Subscribe to the event stream
    pub async fn subscribe(&self) -> Result<broadcast::Receiver<LedgerEvent>> {
        request!(self, Subscribe {})
    }

    /// Persist a snapshot now
    pub async fn save_snapshot(&self) -> Result<()> {
        request!(self, SaveSnapshot {})?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> Result<()> {
        request!(self, Shutdown {})?
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger(ledger: Ledger) -> LedgerHandle {
    let capacity = ledger.config().channels.mailbox_capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity); // Bounded channel for backpressure
    let actor = LedgerActor::new(ledger, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn test_handle() -> LedgerHandle {
        let mut config = Config::default();
        config.snapshot.enabled = false;
        config.snapshot.save_on_shutdown = false;
        spawn_ledger(Ledger::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let handle = test_handle();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_full_transfer_through_handle() {
        let handle = test_handle();
        let operator = AccountId::new(1);

        assert!(handle.register_with_id(operator).await.unwrap());
        let alice = handle.register_with_name(operator, "alice").await.unwrap();
        let bob = handle.register_with_name(operator, "bob").await.unwrap();

        handle.credit(alice, 100).await.unwrap();
        let receipt = handle
            .create_transaction_auto(alice, bob, 40)
            .await
            .unwrap();
        assert_eq!(receipt.transaction_id, TxId::new(1));

        assert_eq!(handle.balance_of(alice).await.unwrap(), 60);
        assert_eq!(handle.balance_of(bob).await.unwrap(), 40);
        assert_eq!(handle.transaction_count().await.unwrap(), 1);
        handle.verify_chain().await.unwrap();

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let handle = test_handle();
        let mut events = handle.subscribe().await.unwrap();

        let id = AccountId::new(9);
        handle.register_with_id(id).await.unwrap();
        handle.credit(id, 10).await.unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            LedgerEvent::AccountCreated { name: None, .. }
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            LedgerEvent::BalanceCredited { new_balance: 10, .. }
        ));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_writers_serialize_cleanly() {
        let handle = test_handle();
        let a = AccountId::new(1);
        let b = AccountId::new(2);
        handle.register_with_id(a).await.unwrap();
        handle.register_with_id(b).await.unwrap();
        handle.credit(a, 1_000).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..10 {
            let h = handle.clone();
            tasks.push(tokio::spawn(async move {
                h.create_transaction_auto(a, b, 10).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(handle.balance_of(a).await.unwrap(), 900);
        assert_eq!(handle.balance_of(b).await.unwrap(), 100);
        assert_eq!(handle.transaction_count().await.unwrap(), 10);
        handle.verify_chain().await.unwrap();

        handle.shutdown().await.unwrap();
    }
}
