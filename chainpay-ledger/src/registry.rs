//! Identifier registry
//!
//! Maps account ids to existence and optional display name, and display
//! names back to ids. Accounts are created by explicit registration and
//! never deleted.

use crate::crypto::{derive_account_id, rederive_account_id};
use crate::error::{Error, Result};
use crate::types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bidirectional name↔id registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierRegistry {
    /// Registered accounts and their optional display name
    accounts: HashMap<AccountId, Option<String>>,

    /// Reverse mapping for name lookups
    names: HashMap<String, AccountId>,
}

impl IdentifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account under a display name, generating its id
    ///
    /// The id is hash-derived from `(name, now_nanos, caller)`; on collision
    /// with an existing id the candidate is re-derived, up to `max_retries`
    /// attempts.
    pub fn register_with_name(
        &mut self,
        name: &str,
        caller: AccountId,
        now_nanos: i64,
        max_retries: u32,
    ) -> Result<AccountId> {
        if self.names.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }

        let mut candidate = derive_account_id(name, now_nanos, caller);
        for attempt in 0..max_retries {
            if !self.accounts.contains_key(&candidate) {
                self.accounts.insert(candidate, Some(name.to_string()));
                self.names.insert(name.to_string(), candidate);
                return Ok(candidate);
            }
            candidate = rederive_account_id(candidate, now_nanos, attempt);
        }

        Err(Error::IdentifierSpaceExhausted {
            attempts: max_retries,
        })
    }

    /// Register an account under a caller-supplied id
    ///
    /// Returns `false` (no-op) if the id already exists.
    pub fn register_with_id(&mut self, id: AccountId) -> bool {
        if self.accounts.contains_key(&id) {
            return false;
        }
        self.accounts.insert(id, None);
        true
    }

    /// Whether the id is registered
    pub fn exists(&self, id: AccountId) -> bool {
        self.accounts.contains_key(&id)
    }

    /// Whether the display name is registered
    pub fn exists_by_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Resolve a display name to its account id
    pub fn id_for_name(&self, name: &str) -> Result<AccountId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("no account named {name:?}")))
    }

    /// Resolve an account id to its display name
    ///
    /// Fails for unregistered ids and for accounts registered without a name.
    pub fn name_for_id(&self, id: AccountId) -> Result<&str> {
        match self.accounts.get(&id) {
            Some(Some(name)) => Ok(name),
            Some(None) => Err(Error::NotFound(format!("account {id} has no name"))),
            None => Err(Error::NotFound(format!("no account {id}"))),
        }
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
