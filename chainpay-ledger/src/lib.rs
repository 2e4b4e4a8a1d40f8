//! ChainPay Ledger Core
//!
//! Append-only, hash-linked transaction ledger with per-user balance
//! accounting, unique-identifier management, and derived per-account indices.
//!
//! # Architecture
//!
//! - **Single Writer**: one logical writer serializes all mutations
//! - **Hash Chain**: each record binds its predecessor's content hash
//! - **Derived Indices**: per-account views reference log positions only
//! - **Event Stream**: every commit publishes one immutable event
//!
//! # Invariants
//!
//! - Money conservation: transfers move value, never create or destroy it
//! - No negative balances: balances are unsigned and debit-checked
//! - Append-only: records are never modified or deleted
//! - Atomicity: a rejected write leaves all state byte-for-byte unchanged

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod balances;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod index;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod types;

// Re-exports
pub use actor::{spawn_ledger, LedgerHandle};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::{Ledger, LedgerState};
pub use types::{
    AccountId, Amount, LedgerEvent, TransactionReceipt, TransactionRecord, TransactionView, TxId,
    ZERO_DIGEST,
};
