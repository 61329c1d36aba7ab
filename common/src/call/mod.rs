//! Call surface
//!
//! One [`Call`] variant per externally reachable operation of the token and
//! the sale, dispatched against a [`Deployment`]. The acting identity and
//! the attached native-currency value travel next to the call, never inside
//! it.

mod deployment;

pub use deployment::*;

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::access::OwnershipTransferred;
use crate::address::Address;
use crate::amount::{self, Amount};
use crate::sale::{SaleError, SalePhase, TokenPurchase};
use crate::time::TimestampSeconds;
use crate::token::{Approval, TokenError, Transfer};

pub const CALL_ERROR_NOT_PAYABLE: u64 = 0x0300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Call {
    // Token queries
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    BalanceOf {
        account: Address,
    },
    Allowance {
        owner: Address,
        spender: Address,
    },

    // Token operations
    Transfer {
        to: Address,
        #[serde(with = "amount::dec_string")]
        value: Amount,
    },
    Approve {
        spender: Address,
        #[serde(with = "amount::dec_string")]
        value: Amount,
    },
    TransferFrom {
        owner: Address,
        to: Address,
        #[serde(with = "amount::dec_string")]
        value: Amount,
    },

    // Sale queries
    HasEnded,
    Phase,
    Wallet,
    StartTime,
    EndTime,
    Rate,
    RateSoft,
    SoftCap,
    FundingGoal,
    WeiRaised,
    TokensSold,
    RemainingSoftTokens,
    Owner,
    Quote {
        #[serde(with = "amount::dec_string")]
        payment: Amount,
    },

    // Sale operations, the payment is the attached value
    BuyTokens {
        beneficiary: Address,
    },
    /// Plain payment to the sale, tokens go to the payer
    BuyTokensForSelf,

    // Owner operations
    SetStart {
        time: TimestampSeconds,
    },
    SetEnd {
        time: TimestampSeconds,
    },
    TransferOwnership {
        new_owner: Address,
    },
}

impl Call {
    /// Only purchases accept an attached value
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::BuyTokens { .. } | Self::BuyTokensForSelf)
    }

    pub fn is_read_only(&self) -> bool {
        !matches!(
            self,
            Self::Transfer { .. }
                | Self::Approve { .. }
                | Self::TransferFrom { .. }
                | Self::BuyTokens { .. }
                | Self::BuyTokensForSelf
                | Self::SetStart { .. }
                | Self::SetEnd { .. }
                | Self::TransferOwnership { .. }
        )
    }

    /// Snake-case method name, identical to the serde tag
    pub fn method(&self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Amount(#[serde(with = "amount::dec_string")] Amount),
    Bool(bool),
    Text(String),
    Number(u64),
    Address(Address),
    Phase(SalePhase),
    Transfer(Transfer),
    Approval(Approval),
    Purchase(TokenPurchase),
    OwnershipTransferred(OwnershipTransferred),
    /// Successful call without a result
    Done,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    #[error("{method} does not accept a payment")]
    NotPayable { method: &'static str },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Sale(#[from] SaleError),
}

impl CallError {
    pub fn code(&self) -> u64 {
        match self {
            Self::NotPayable { .. } => CALL_ERROR_NOT_PAYABLE,
            Self::Token(e) => e.code(),
            Self::Sale(e) => e.code(),
        }
    }
}
