//! Token Ledger
//!
//! Fixed-supply ERC20-style token: balances, allowances and the records of
//! every successful mutation. The whole supply is credited to the creating
//! account and never changes afterwards.
//!
//! # Approval policy
//!
//! `approve` refuses to move a nonzero allowance directly to another nonzero
//! value. The owner must approve 0 first, which closes the classic
//! "spend old allowance, then spend new allowance" race.

mod error;
mod ledger;
mod overlay;

pub use error::*;
pub use ledger::*;
pub use overlay::*;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::{self, Amount, TOKEN_DECIMALS};

/// Default token name
pub const TOKEN_NAME: &str = "FastInvest Token";

/// Default token symbol/ticker
pub const TOKEN_SYMBOL: &str = "FIT";

/// Default supply in whole tokens (777M FIT)
pub const TOTAL_SUPPLY_TOKENS: u64 = 777_000_000;

/// Immutable token parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "amount::dec_string")]
    pub total_supply: Amount,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: TOKEN_NAME.to_owned(),
            symbol: TOKEN_SYMBOL.to_owned(),
            decimals: TOKEN_DECIMALS,
            // 777M * 10^18 fits a U256 by a wide margin
            total_supply: Amount::from(TOTAL_SUPPLY_TOKENS) * Amount::exp10(TOKEN_DECIMALS as usize),
        }
    }
}

/// Tokens moved from `from` to `to`.
/// The creation credit is recorded with `from` = null address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    #[serde(with = "amount::dec_string")]
    pub value: Amount,
}

/// `spender` may now move up to `value` out of `owner`'s balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "amount::dec_string")]
    pub value: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TokenEvent {
    Transfer(Transfer),
    Approval(Approval),
}

impl From<Transfer> for TokenEvent {
    fn from(record: Transfer) -> Self {
        Self::Transfer(record)
    }
}

impl From<Approval> for TokenEvent {
    fn from(record: Approval) -> Self {
        Self::Approval(record)
    }
}
