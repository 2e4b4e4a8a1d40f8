//! Balance ledger
//!
//! Maps account ids to non-negative balances. Balances only grow through
//! explicit credit operations; transfers conserve the total exactly.

use crate::error::{Error, Result};
use crate::types::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-account balance book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceBook {
    balances: HashMap<AccountId, Amount>,
}

impl BalanceBook {
    /// Create an empty balance book
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a zero balance for a freshly registered account
    pub fn open_account(&mut self, id: AccountId) {
        self.balances.entry(id).or_insert(0);
    }

    /// Increase a balance by a positive amount
    ///
    /// Rejects zero amounts, unknown accounts, and overflow. Returns the new
    /// balance.
    pub fn credit(&mut self, id: AccountId, amount: Amount) -> Result<Amount> {
        if amount == 0 {
            return Err(Error::InvalidAmount(
                "credit amount must be positive".to_string(),
            ));
        }
        self.deposit(id, amount)
    }

    /// Increase a balance, accepting zero amounts
    ///
    /// Rejects unknown accounts and overflow. Returns the new balance.
    pub fn deposit(&mut self, id: AccountId, amount: Amount) -> Result<Amount> {
        let balance = self
            .balances
            .get_mut(&id)
            .ok_or(Error::UnknownAccount(id))?;
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| Error::InvalidAmount("balance overflow".to_string()))?;
        Ok(*balance)
    }

    /// Decrease a balance
    ///
    /// Returns `false` with no mutation if the amount is zero, the account is
    /// unknown, or the balance is insufficient.
    pub fn debit(&mut self, id: AccountId, amount: Amount) -> bool {
        if amount == 0 {
            return false;
        }
        match self.balances.get_mut(&id) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                true
            }
            _ => false,
        }
    }

    /// Move an amount from sender to receiver as one atomic step
    ///
    /// Returns `false` with no mutation under the same conditions as
    /// [`debit`](Self::debit) on the sender, if the receiver is unknown, or
    /// if the receiver balance would overflow. Either both sides mutate or
    /// neither does.
    pub fn transfer(&mut self, sender: AccountId, receiver: AccountId, amount: Amount) -> bool {
        if amount == 0 {
            return false;
        }
        let Some(&sender_balance) = self.balances.get(&sender) else {
            return false;
        };
        if sender_balance < amount {
            return false;
        }
        let Some(&receiver_balance) = self.balances.get(&receiver) else {
            return false;
        };
        // A self-transfer nets to zero, so only distinct receivers can overflow.
        if sender != receiver && receiver_balance.checked_add(amount).is_none() {
            return false;
        }

        // All checks passed; both mutations commit together.
        if let Some(balance) = self.balances.get_mut(&sender) {
            *balance -= amount;
        }
        if let Some(balance) = self.balances.get_mut(&receiver) {
            *balance += amount;
        }
        true
    }

    /// Current balance, zero for accounts without one
    pub fn balance_of(&self, id: AccountId) -> Amount {
        self.balances.get(&id).copied().unwrap_or(0)
    }

    /// Sum of all balances (saturating; audit use only)
    pub fn total(&self) -> Amount {
        self.balances
            .values()
            .fold(0u128, |acc, b| acc.saturating_add(*b))
    }
}
