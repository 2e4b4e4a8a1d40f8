//! Index manager
//!
//! Derived per-account views over the transaction log: for each account an
//! ordered sequence of log positions for all, sent, and received
//! transactions, plus an addressable transaction-id→position map that doubles
//! as the O(1) duplicate-id check.

use crate::types::{AccountId, TxId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-account and per-transaction-id indices into the log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIndex {
    all: HashMap<AccountId, Vec<u64>>,
    sent: HashMap<AccountId, Vec<u64>>,
    received: HashMap<AccountId, Vec<u64>>,
    by_transaction_id: HashMap<TxId, u64>,
}

impl TxIndex {
    /// Create empty indices
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed transaction's involvement
    ///
    /// Appends `position` to `all` for both parties, to `sent` for the
    /// sender, and to `received` for the receiver. A self-transfer therefore
    /// appears twice in `all` but once each in `sent` and `received`.
    pub fn record_involvement(
        &mut self,
        position: u64,
        transaction_id: TxId,
        sender: AccountId,
        receiver: AccountId,
    ) {
        self.all.entry(sender).or_default().push(position);
        self.all.entry(receiver).or_default().push(position);
        self.sent.entry(sender).or_default().push(position);
        self.received.entry(receiver).or_default().push(position);
        self.by_transaction_id.insert(transaction_id, position);
    }

    /// Whether a transaction id has already been committed
    pub fn contains_transaction_id(&self, transaction_id: TxId) -> bool {
        self.by_transaction_id.contains_key(&transaction_id)
    }

    /// Log position of a committed transaction id
    pub fn position_of(&self, transaction_id: TxId) -> Option<u64> {
        self.by_transaction_id.get(&transaction_id).copied()
    }

    /// All log positions involving an account, in insertion order
    pub fn all_for(&self, id: AccountId) -> &[u64] {
        self.all.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Log positions sent by an account, in insertion order
    pub fn sent_for(&self, id: AccountId) -> &[u64] {
        self.sent.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Log positions received by an account, in insertion order
    pub fn received_for(&self, id: AccountId) -> &[u64] {
        self.received.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}
