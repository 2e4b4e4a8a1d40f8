//! Transaction log
//!
//! An ordered, append-only sequence of immutable [`TransactionRecord`]s.
//! Each record stores the content hash of its predecessor, forming a
//! tamper-evident linear chain independent of any per-account view.

use crate::error::{Error, Result};
use crate::types::{AccountId, Amount, TransactionRecord, TxId, ZERO_DIGEST};
use serde::{Deserialize, Serialize};

/// Hash-linked append-only transaction log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionChain {
    records: Vec<TransactionRecord>,
}

impl TransactionChain {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new record, linking it to the current tail
    ///
    /// `previous_hash` is the content hash of the current last record, or the
    /// zero digest for the first. Returns the 0-based position of the new
    /// record.
    pub fn append(
        &mut self,
        sender: AccountId,
        receiver: AccountId,
        amount: Amount,
        transaction_id: TxId,
        timestamp_nanos: i64,
    ) -> u64 {
        let previous_hash = self
            .records
            .last()
            .map(TransactionRecord::content_hash)
            .unwrap_or(ZERO_DIGEST);

        self.records.push(TransactionRecord {
            sender,
            receiver,
            amount,
            timestamp_nanos,
            transaction_id,
            previous_hash,
        });

        (self.records.len() - 1) as u64
    }

    /// Record at a log position
    pub fn get(&self, position: u64) -> Option<&TransactionRecord> {
        self.records.get(position as usize)
    }

    /// Number of records in the log
    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records in log order
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter()
    }

    /// Linear scan for a record by transaction id
    ///
    /// Convenience lookup only; duplicate detection and position lookup go
    /// through the index manager's O(1) map.
    pub fn find_by_transaction_id(
        &self,
        transaction_id: TxId,
    ) -> Option<(u64, &TransactionRecord)> {
        self.records
            .iter()
            .enumerate()
            .find(|(_, r)| r.transaction_id == transaction_id)
            .map(|(i, r)| (i as u64, r))
    }

    /// Re-derive the whole chain and verify every stored link
    pub fn verify(&self) -> Result<()> {
        let mut expected = ZERO_DIGEST;
        for (position, record) in self.records.iter().enumerate() {
            if record.previous_hash != expected {
                return Err(Error::InvariantViolation(format!(
                    "hash chain broken at position {position}"
                )));
            }
            expected = record.content_hash();
        }
        Ok(())
    }
}
