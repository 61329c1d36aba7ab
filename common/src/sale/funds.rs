use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use thiserror::Error;

use crate::address::Address;
use crate::amount::Amount;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ForwardError {
    #[error("Payer {payer} holds {available}, cannot send {needed}")]
    InsufficientFunds {
        payer: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("Destination {0} refuses deposits")]
    Rejected(Address),

    #[error("Balance overflow at {0}")]
    Overflow(Address),
}

/// Custody of the native currency paid into the sale
///
/// `forward` must be all-or-nothing: on error no balance has moved.
pub trait FundsForwarder {
    fn forward(&mut self, payer: &Address, to: &Address, amount: Amount) -> Result<(), ForwardError>;
}

/// In-memory native-currency balances
#[derive(Debug, Clone, Default)]
pub struct NativeBank {
    balances: HashMap<Address, Amount>,
    rejecting: HashSet<Address>,
}

impl NativeBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Credit `amount` out of thin air, returns the new balance
    pub fn deposit(&mut self, account: &Address, amount: Amount) -> Result<Amount, ForwardError> {
        let balance = self
            .balance_of(account)
            .checked_add(amount)
            .ok_or(ForwardError::Overflow(*account))?;
        self.balances.insert(*account, balance);
        Ok(balance)
    }

    /// Make every later `forward` to `account` fail
    pub fn reject_deposits_to(&mut self, account: Address) {
        self.rejecting.insert(account);
    }

    pub fn accept_deposits_to(&mut self, account: &Address) {
        self.rejecting.remove(account);
    }

    /// Sum of all balances, None on overflow
    pub fn total(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::zero(), |sum, balance| sum.checked_add(*balance))
    }
}

impl FundsForwarder for NativeBank {
    fn forward(&mut self, payer: &Address, to: &Address, amount: Amount) -> Result<(), ForwardError> {
        if self.rejecting.contains(to) {
            warn!("Forward of {} from {} refused by {}", amount, payer, to);
            return Err(ForwardError::Rejected(*to));
        }

        let available = self.balance_of(payer);
        let new_payer = available
            .checked_sub(amount)
            .ok_or(ForwardError::InsufficientFunds {
                payer: *payer,
                needed: amount,
                available,
            })?;

        if payer == to {
            return Ok(());
        }

        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(ForwardError::Overflow(*to))?;

        self.balances.insert(*payer, new_payer);
        self.balances.insert(*to, new_to);

        if log::log_enabled!(log::Level::Debug) {
            debug!("Forwarded {} from {} to {}", amount, payer, to);
        }
        Ok(())
    }
}
