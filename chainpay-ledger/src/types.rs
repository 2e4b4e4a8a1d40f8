//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Memory safety (no unsafe code)
//! - Exact integer arithmetic (u128, overflow-checked at mutation sites)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Monetary amount. Non-negative by construction; every mutation site is
/// overflow-checked.
pub type Amount = u128;

/// The zero digest. `previous_hash` of the first record in the chain.
pub const ZERO_DIGEST: [u8; 32] = [0u8; 32];

/// Numeric account identifier
///
/// Generated by the identifier registry (hash-derived) or supplied by the
/// caller at registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AccountId(u128);

impl AccountId {
    /// Create from a raw numeric value
    pub const fn new(id: u128) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn value(self) -> u128 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Transaction identifier
///
/// Unique across the whole log. Caller-supplied on the manual path, allocated
/// from a monotonic counter on the auto path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TxId(u128);

impl TxId {
    /// Create from a raw numeric value
    pub const fn new(id: u128) -> Self {
        Self(id)
    }

    /// Raw numeric value
    pub const fn value(self) -> u128 {
        self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable transaction record
///
/// Created exactly once at transfer time, appended to the transaction log,
/// never mutated or removed. Owned exclusively by the log; per-account
/// indices reference it by log position only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Debited account
    pub sender: AccountId,

    /// Credited account
    pub receiver: AccountId,

    /// Transferred amount (always > 0)
    pub amount: Amount,

    /// Commit timestamp (nanoseconds since Unix epoch)
    pub timestamp_nanos: i64,

    /// Unique transaction identifier
    pub transaction_id: TxId,

    /// Content hash of the predecessor record (zero digest for the first)
    pub previous_hash: [u8; 32],
}

impl TransactionRecord {
    /// Compute the content hash of this record
    ///
    /// Deterministic SHA-256 digest over all fields in fixed order, including
    /// `previous_hash`, so each record binds the whole chain before it.
    pub fn content_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.sender.value().to_be_bytes());
        hasher.update(self.receiver.value().to_be_bytes());
        hasher.update(self.amount.to_be_bytes());
        hasher.update(self.timestamp_nanos.to_be_bytes());
        hasher.update(self.transaction_id.value().to_be_bytes());
        hasher.update(self.previous_hash);
        hasher.finalize().into()
    }
}

/// Read view of a committed transaction
///
/// Assembled from the log for query paths; carries the log position and the
/// stored predecessor hash alongside the record fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    /// Position in the transaction log (0-based)
    pub position: u64,

    /// Transaction identifier
    pub transaction_id: TxId,

    /// Debited account
    pub sender: AccountId,

    /// Credited account
    pub receiver: AccountId,

    /// Transferred amount
    pub amount: Amount,

    /// Commit timestamp (nanoseconds since Unix epoch)
    pub timestamp_nanos: i64,

    /// Content hash of the predecessor record
    pub previous_hash: [u8; 32],
}

impl TransactionView {
    /// Build a view from a stored record and its log position
    pub fn from_record(position: u64, record: &TransactionRecord) -> Self {
        Self {
            position,
            transaction_id: record.transaction_id,
            sender: record.sender,
            receiver: record.receiver,
            amount: record.amount,
            timestamp_nanos: record.timestamp_nanos,
            previous_hash: record.previous_hash,
        }
    }
}

/// Receipt returned by the two transaction write paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Position of the committed record in the log
    pub position: u64,

    /// Transaction identifier (caller-supplied or allocated)
    pub transaction_id: TxId,

    /// Commit timestamp (nanoseconds since Unix epoch)
    pub timestamp_nanos: i64,
}

/// Event published on every successful mutation
///
/// Payloads carry resulting totals so an external observer can reconstruct
/// ledger state from the event stream alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// An account was registered
    AccountCreated {
        /// New account id
        id: AccountId,
        /// Display name, if registered by name
        name: Option<String>,
        /// Registration timestamp
        timestamp_nanos: i64,
    },

    /// An account balance was increased (credit or deposit)
    BalanceCredited {
        /// Credited account
        id: AccountId,
        /// Credited amount
        amount: Amount,
        /// Resulting balance
        new_balance: Amount,
        /// Mutation timestamp
        timestamp_nanos: i64,
    },

    /// An account balance was decreased outside a transfer
    BalanceDebited {
        /// Debited account
        id: AccountId,
        /// Debited amount
        amount: Amount,
        /// Resulting balance
        new_balance: Amount,
        /// Mutation timestamp
        timestamp_nanos: i64,
    },

    /// A transaction was committed to the log
    TransactionCreated {
        /// Log position of the new record
        position: u64,
        /// Transaction identifier
        transaction_id: TxId,
        /// Debited account
        sender: AccountId,
        /// Credited account
        receiver: AccountId,
        /// Transferred amount
        amount: Amount,
        /// Sender balance after the transfer
        sender_balance: Amount,
        /// Receiver balance after the transfer
        receiver_balance: Amount,
        /// Commit timestamp
        timestamp_nanos: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: Amount, previous_hash: [u8; 32]) -> TransactionRecord {
        TransactionRecord {
            sender: AccountId::new(1),
            receiver: AccountId::new(2),
            amount,
            timestamp_nanos: 1_700_000_000_000_000_000,
            transaction_id: TxId::new(1),
            previous_hash,
        }
    }

    #[test]
    fn test_content_hash_deterministic() {
        let r = record(100, ZERO_DIGEST);
        assert_eq!(r.content_hash(), r.content_hash());
    }

    #[test]
    fn test_content_hash_binds_every_field() {
        let base = record(100, ZERO_DIGEST);

        let mut changed = base.clone();
        changed.amount = 101;
        assert_ne!(base.content_hash(), changed.content_hash());

        let mut changed = base.clone();
        changed.previous_hash = [7u8; 32];
        assert_ne!(base.content_hash(), changed.content_hash());

        let mut changed = base.clone();
        changed.transaction_id = TxId::new(2);
        assert_ne!(base.content_hash(), changed.content_hash());
    }

    #[test]
    fn test_view_from_record() {
        let r = record(42, ZERO_DIGEST);
        let view = TransactionView::from_record(3, &r);
        assert_eq!(view.position, 3);
        assert_eq!(view.amount, 42);
        assert_eq!(view.previous_hash, ZERO_DIGEST);
    }

    #[test]
    fn test_account_id_display() {
        assert_eq!(AccountId::new(255).to_string(), "0xff");
        assert_eq!(TxId::new(255).to_string(), "255");
    }
}
