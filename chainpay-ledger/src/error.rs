//! Error types for the ledger

use crate::types::{AccountId, Amount, TxId};
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
///
/// Validation errors are raised synchronously before any mutation, so a
/// failed operation leaves all state exactly as it was.
#[derive(Error, Debug)]
pub enum Error {
    /// Account id is not registered
    #[error("Unknown account: {0}")]
    UnknownAccount(AccountId),

    /// Name lookup miss (name→id or id→name)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Display name already registered
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// Transaction id already used by a committed transaction
    #[error("Duplicate transaction id: {0}")]
    DuplicateTransactionId(TxId),

    /// Zero amount where a positive one is required, or arithmetic overflow
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Sender balance cannot cover the requested amount
    #[error("Insufficient balance: account {account} holds {balance}, requested {requested}")]
    InsufficientBalance {
        /// Account being debited
        account: AccountId,
        /// Current balance
        balance: Amount,
        /// Requested amount
        requested: Amount,
    },

    /// Identifier generation exhausted its collision-retry budget
    #[error("Identifier space exhausted after {attempts} attempts")]
    IdentifierSpaceExhausted {
        /// Number of candidates tried
        attempts: u32,
    },

    /// Invariant violation (hash chain, conservation, etc.)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Snapshot storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registration error
    #[error("Metrics error: {0}")]
    Metrics(String),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prometheus::Error> for Error {
    fn from(err: prometheus::Error) -> Self {
        Error::Metrics(err.to_string())
    }
}
