//! Sale Engine
//!
//! A crowdsale selling the token against native-currency payments during a
//! time window. Tokens are not owned by the sale: every purchase pulls them
//! out of the deployer's balance through the allowance the deployer granted
//! to the sale's address, and the payment is forwarded to the sale wallet.
//!
//! Prices are tiered. Until `soft_cap` tokens are sold one unit of payment
//! buys `rate_soft` tokens, afterwards it buys `rate` tokens (see
//! [`pricing`]).

mod engine;
mod error;
mod funds;
pub mod pricing;

pub use engine::*;
pub use error::*;
pub use funds::*;

use serde::{Deserialize, Serialize};

use crate::access::OwnershipTransferred;
use crate::address::Address;
use crate::amount::{self, Amount};
use crate::time::TimestampSeconds;

/// Tokens per unit of payment after the soft cap
pub const RATE: u64 = 1000;

/// Tokens per unit of payment until the soft cap
pub const RATE_SOFT: u64 = 1200;

/// Soft cap in whole tokens
pub const SOFT_CAP_TOKENS: u64 = 38_850_000;

/// Funding goal in whole tokens
pub const FUNDING_GOAL_TOKENS: u64 = 388_500_000;

/// 0xe17217B991cBb6BA78CcCb918b2052C2aE9B5aDe
pub const DEFAULT_WALLET: Address = Address::new([
    0xe1, 0x72, 0x17, 0xb9, 0x91, 0xcb, 0xb6, 0xba, 0x78, 0xcc, 0xcb, 0x91, 0x8b, 0x20, 0x52, 0xc2,
    0xae, 0x9b, 0x5a, 0xde,
]);

/// 2017-12-04 10:00:00 UTC
pub const DEFAULT_START_TIME: TimestampSeconds = 1_512_381_600;

/// 2018-01-31 15:00:00 UTC
pub const DEFAULT_END_TIME: TimestampSeconds = 1_517_410_800;

/// Construction parameters of a sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaleParams {
    pub wallet: Address,
    pub start_time: TimestampSeconds,
    pub end_time: TimestampSeconds,
    pub rate: u64,
    pub rate_soft: u64,
    #[serde(with = "amount::dec_string")]
    pub soft_cap: Amount,
    #[serde(with = "amount::dec_string")]
    pub funding_goal: Amount,
}

impl SaleParams {
    /// Start and end times are not checked against each other
    pub fn validate(&self) -> SaleResult<()> {
        if self.wallet.is_zero() {
            return Err(SaleError::InvalidParams("wallet is the null address".into()));
        }
        if self.rate == 0 || self.rate_soft == 0 {
            return Err(SaleError::InvalidParams("rates must be nonzero".into()));
        }
        if self.soft_cap > self.funding_goal {
            return Err(SaleError::InvalidParams(format!(
                "soft cap {} exceeds funding goal {}",
                self.soft_cap, self.funding_goal
            )));
        }
        Ok(())
    }
}

impl Default for SaleParams {
    fn default() -> Self {
        let token_unit = Amount::exp10(amount::TOKEN_DECIMALS as usize);
        Self {
            wallet: DEFAULT_WALLET,
            start_time: DEFAULT_START_TIME,
            end_time: DEFAULT_END_TIME,
            rate: RATE,
            rate_soft: RATE_SOFT,
            soft_cap: Amount::from(SOFT_CAP_TOKENS) * token_unit,
            funding_goal: Amount::from(FUNDING_GOAL_TOKENS) * token_unit,
        }
    }
}

/// Where a sale stands relative to its window at a given time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalePhase {
    NotStarted,
    Open,
    Ended,
}

/// Acting identity and clock reading of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub now: TimestampSeconds,
}

impl CallContext {
    pub fn new(caller: Address, now: TimestampSeconds) -> Self {
        Self { caller, now }
    }
}

/// `purchaser` paid `value` and `beneficiary` received `amount` tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPurchase {
    pub purchaser: Address,
    pub beneficiary: Address,
    #[serde(with = "amount::dec_string")]
    pub value: Amount,
    #[serde(with = "amount::dec_string")]
    pub amount: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SaleEvent {
    TokenPurchase(TokenPurchase),
    OwnershipTransferred(OwnershipTransferred),
}
