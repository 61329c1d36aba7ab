use std::collections::HashMap;

use log::{debug, trace};

use crate::address::Address;
use crate::amount::Amount;
use crate::events::EventLog;

use super::{
    Approval, LedgerKey, LedgerOverlay, TokenError, TokenEvent, TokenMetadata, TokenResult,
    Transfer,
};

/// Fixed-supply token ledger
///
/// Every mutating operation is staged into a [`LedgerOverlay`] and applied
/// with [`TokenLedger::commit`], so a call either lands completely (writes
/// and record) or not at all.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    metadata: TokenMetadata,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    events: EventLog<TokenEvent>,
}

impl TokenLedger {
    /// Create the ledger and credit the whole supply to `creator`
    pub fn new(creator: Address, metadata: TokenMetadata) -> Self {
        let supply = metadata.total_supply;
        let mut balances = HashMap::new();
        if !supply.is_zero() {
            balances.insert(creator, supply);
        }

        let mut events = EventLog::new();
        events.push(TokenEvent::Transfer(Transfer {
            from: Address::zero(),
            to: creator,
            value: supply,
        }));

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Token {} created, {} credited to {}",
                metadata.symbol, supply, creator
            );
        }

        Self {
            metadata,
            balances,
            allowances: HashMap::new(),
            events,
        }
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.metadata.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn events(&self) -> &EventLog<TokenEvent> {
        &self.events
    }

    /// Accounts holding a nonzero balance
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Sum of all balances, None on overflow. Always equals the total supply.
    pub fn sum_of_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::zero(), |sum, balance| sum.checked_add(*balance))
    }

    // ========================================
    // Public operations
    // ========================================

    /// Move `value` from `caller` to `to`
    pub fn transfer(&mut self, caller: &Address, to: &Address, value: Amount) -> TokenResult<Transfer> {
        let mut overlay = LedgerOverlay::new();
        let record = self.stage_transfer(&mut overlay, caller, to, value)?;
        self.commit(overlay);
        Ok(record)
    }

    /// Set the allowance of `spender` over `caller`'s balance
    pub fn approve(&mut self, caller: &Address, spender: &Address, value: Amount) -> TokenResult<Approval> {
        let mut overlay = LedgerOverlay::new();
        let record = self.stage_approve(&mut overlay, caller, spender, value)?;
        self.commit(overlay);
        Ok(record)
    }

    /// Move `value` from `owner` to `to`, spending `caller`'s allowance
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        owner: &Address,
        to: &Address,
        value: Amount,
    ) -> TokenResult<Transfer> {
        let mut overlay = LedgerOverlay::new();
        let record = self.stage_transfer_from(&mut overlay, caller, owner, to, value)?;
        self.commit(overlay);
        Ok(record)
    }

    // ========================================
    // Staging
    // ========================================

    /// Read a slot through the overlay
    pub fn read(&self, overlay: &LedgerOverlay, key: &LedgerKey) -> Amount {
        if let Some(value) = overlay.get(key) {
            return value;
        }

        match key {
            LedgerKey::Balance(account) => self.balance_of(account),
            LedgerKey::Allowance { owner, spender } => self.allowance(owner, spender),
        }
    }

    /// Stage a transfer; nothing is written to the ledger itself
    pub fn stage_transfer(
        &self,
        overlay: &mut LedgerOverlay,
        from: &Address,
        to: &Address,
        value: Amount,
    ) -> TokenResult<Transfer> {
        self.stage_move(overlay, from, to, value)?;

        let record = Transfer {
            from: *from,
            to: *to,
            value,
        };
        overlay.record(record.into());
        Ok(record)
    }

    pub fn stage_approve(
        &self,
        overlay: &mut LedgerOverlay,
        owner: &Address,
        spender: &Address,
        value: Amount,
    ) -> TokenResult<Approval> {
        let key = LedgerKey::Allowance {
            owner: *owner,
            spender: *spender,
        };
        let current = self.read(overlay, &key);
        if !current.is_zero() && !value.is_zero() {
            return Err(TokenError::UnsafeApprovalChange {
                current,
                requested: value,
            });
        }

        overlay.set(key, value);

        let record = Approval {
            owner: *owner,
            spender: *spender,
            value,
        };
        overlay.record(record.into());
        Ok(record)
    }

    pub fn stage_transfer_from(
        &self,
        overlay: &mut LedgerOverlay,
        spender: &Address,
        owner: &Address,
        to: &Address,
        value: Amount,
    ) -> TokenResult<Transfer> {
        let key = LedgerKey::Allowance {
            owner: *owner,
            spender: *spender,
        };
        let allowance = self.read(overlay, &key);
        let remaining = allowance
            .checked_sub(value)
            .ok_or(TokenError::InsufficientAllowance {
                needed: value,
                available: allowance,
            })?;

        // Balance is checked before the allowance slot is written
        self.stage_move(overlay, owner, to, value)?;
        overlay.set(key, remaining);

        let record = Transfer {
            from: *owner,
            to: *to,
            value,
        };
        overlay.record(record.into());
        Ok(record)
    }

    fn stage_move(
        &self,
        overlay: &mut LedgerOverlay,
        from: &Address,
        to: &Address,
        value: Amount,
    ) -> TokenResult<()> {
        let from_key = LedgerKey::Balance(*from);
        let from_balance = self.read(overlay, &from_key);
        let new_from = from_balance
            .checked_sub(value)
            .ok_or(TokenError::InsufficientBalance {
                needed: value,
                available: from_balance,
            })?;

        if from == to {
            return Ok(());
        }

        let to_key = LedgerKey::Balance(*to);
        let new_to = self
            .read(overlay, &to_key)
            .checked_add(value)
            .ok_or(TokenError::Overflow)?;

        overlay.set(from_key, new_from);
        overlay.set(to_key, new_to);
        Ok(())
    }

    /// Apply a staged overlay. Cannot fail: every check ran while staging.
    pub fn commit(&mut self, overlay: LedgerOverlay) {
        if overlay.is_empty() {
            return;
        }
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Committing {} slot writes and {} records",
                overlay.len(),
                overlay.events().len()
            );
        }

        let (changes, events) = overlay.into_parts();
        for (key, value) in changes {
            match key {
                LedgerKey::Balance(account) => {
                    if value.is_zero() {
                        self.balances.remove(&account);
                    } else {
                        self.balances.insert(account, value);
                    }
                }
                LedgerKey::Allowance { owner, spender } => {
                    if value.is_zero() {
                        self.allowances.remove(&(owner, spender));
                    } else {
                        self.allowances.insert((owner, spender), value);
                    }
                }
            }
        }

        for event in events {
            if log::log_enabled!(log::Level::Trace) {
                trace!("Token event: {:?}", event);
            }
            self.events.push(event);
        }
    }
}
