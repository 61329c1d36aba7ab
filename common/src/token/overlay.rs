use std::collections::HashMap;

use crate::address::Address;
use crate::amount::Amount;

use super::TokenEvent;

/// Key types for overlay storage
///
/// Each variant is one storage slot of the token ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerKey {
    /// Balance of an account
    Balance(Address),
    /// Allowance from owner to spender
    Allowance { owner: Address, spender: Address },
}

/// Overlay cache for token ledger operations
///
/// Accumulates the writes and records of one call. The ledger applies it
/// with `TokenLedger::commit` once every fallible step of the call has
/// succeeded; on failure the overlay is simply dropped and the ledger is
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct LedgerOverlay {
    /// Changes to be applied (key → value)
    changes: HashMap<LedgerKey, Amount>,
    /// Records emitted by the staged operations, in order
    events: Vec<TokenEvent>,
}

impl LedgerOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the overlay holds neither writes nor records
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Number of distinct slots written
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Get a staged value (None if the slot was not written)
    pub fn get(&self, key: &LedgerKey) -> Option<Amount> {
        self.changes.get(key).copied()
    }

    pub fn set(&mut self, key: LedgerKey, value: Amount) {
        self.changes.insert(key, value);
    }

    pub fn record(&mut self, event: TokenEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    pub(super) fn into_parts(self) -> (HashMap<LedgerKey, Amount>, Vec<TokenEvent>) {
        (self.changes, self.events)
    }
}
