//! Cryptographic operations for the ledger
//!
//! This module provides:
//! - SHA-256 hashing for records and arbitrary bytes
//! - Deterministic account id derivation with collision re-derivation
//!
//! Caller signature verification is delegated to the surrounding execution
//! environment and is intentionally absent here.

use crate::types::AccountId;
use sha2::{Digest, Sha256};

/// Hash arbitrary bytes using SHA-256
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive an account id from a display name
///
/// SHA-256 over `(name, now_nanos, caller)` reduced to the `u128` identifier
/// space. Deterministic for fixed inputs; the registry handles collisions via
/// [`rederive_account_id`].
pub fn derive_account_id(name: &str, now_nanos: i64, caller: AccountId) -> AccountId {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(now_nanos.to_be_bytes());
    hasher.update(caller.value().to_be_bytes());
    AccountId::new(truncate_digest(hasher.finalize().into()))
}

/// Re-derive a candidate id after a collision
///
/// Feeds the colliding candidate back through the hash together with the
/// timestamp and the attempt counter, so successive attempts walk distinct
/// points of the identifier space.
pub fn rederive_account_id(candidate: AccountId, now_nanos: i64, attempt: u32) -> AccountId {
    let mut hasher = Sha256::new();
    hasher.update(candidate.value().to_be_bytes());
    hasher.update(now_nanos.to_be_bytes());
    hasher.update(attempt.to_be_bytes());
    AccountId::new(truncate_digest(hasher.finalize().into()))
}

/// Reduce a 32-byte digest into the u128 identifier space (first 16 bytes,
/// big-endian)
fn truncate_digest(digest: [u8; 32]) -> u128 {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    u128::from_be_bytes(bytes)
}
