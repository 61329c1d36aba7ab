//! Sale Engine Error Codes
//!
//! Range: 0x0200 - 0x02FF
//! Format: SALE_ERROR_<SPECIFIC>
//! Token ledger failures keep their own 0x01xx codes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{OwnershipError, Unauthorized};
use crate::address::Address;
use crate::time::TimestampSeconds;
use crate::token::TokenError;

use super::ForwardError;

pub const SALE_ERROR_NOT_ACTIVE: u64 = 0x0200;
pub const SALE_ERROR_NULL_BENEFICIARY: u64 = 0x0210;
pub const SALE_ERROR_ZERO_PAYMENT: u64 = 0x0211;
pub const SALE_ERROR_UNAUTHORIZED: u64 = 0x0220;
pub const SALE_ERROR_INVALID_OWNER: u64 = 0x0221;
pub const SALE_ERROR_TRANSFER_FAILED: u64 = 0x0230;
pub const SALE_ERROR_INVALID_PARAMS: u64 = 0x0240;
pub const SALE_ERROR_OVERFLOW: u64 = 0x0250;

/// Why a purchase request was malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseRejection {
    NullBeneficiary,
    ZeroPayment,
}

impl fmt::Display for PurchaseRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullBeneficiary => write!(f, "beneficiary is the null address"),
            Self::ZeroPayment => write!(f, "payment is zero"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaleError {
    #[error("Sale is not active at {now} (window {start}..={end})")]
    SaleNotActive {
        now: TimestampSeconds,
        start: TimestampSeconds,
        end: TimestampSeconds,
    },

    #[error("Invalid purchase: {0}")]
    InvalidPurchase(PurchaseRejection),

    #[error("Caller {caller} is not the owner")]
    Unauthorized { caller: Address },

    #[error("New owner cannot be the null address")]
    InvalidOwner,

    #[error("Forwarding funds failed: {0}")]
    TransferFailed(#[from] ForwardError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Invalid sale parameters: {0}")]
    InvalidParams(String),

    #[error("Sale counter overflow")]
    Overflow,
}

impl SaleError {
    pub fn code(&self) -> u64 {
        match self {
            Self::SaleNotActive { .. } => SALE_ERROR_NOT_ACTIVE,
            Self::InvalidPurchase(PurchaseRejection::NullBeneficiary) => SALE_ERROR_NULL_BENEFICIARY,
            Self::InvalidPurchase(PurchaseRejection::ZeroPayment) => SALE_ERROR_ZERO_PAYMENT,
            Self::Unauthorized { .. } => SALE_ERROR_UNAUTHORIZED,
            Self::InvalidOwner => SALE_ERROR_INVALID_OWNER,
            Self::TransferFailed(_) => SALE_ERROR_TRANSFER_FAILED,
            Self::Token(e) => e.code(),
            Self::InvalidParams(_) => SALE_ERROR_INVALID_PARAMS,
            Self::Overflow => SALE_ERROR_OVERFLOW,
        }
    }
}

impl From<Unauthorized> for SaleError {
    fn from(err: Unauthorized) -> Self {
        Self::Unauthorized { caller: err.caller }
    }
}

impl From<OwnershipError> for SaleError {
    fn from(err: OwnershipError) -> Self {
        match err {
            OwnershipError::Unauthorized(e) => e.into(),
            OwnershipError::InvalidOwner => Self::InvalidOwner,
        }
    }
}

/// Result type for sale operations
pub type SaleResult<T> = Result<T, SaleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;

    #[test]
    fn test_error_display() {
        let err = SaleError::SaleNotActive {
            now: 5,
            start: 10,
            end: 20,
        };
        assert_eq!(err.to_string(), "Sale is not active at 5 (window 10..=20)");

        let err = SaleError::InvalidPurchase(PurchaseRejection::ZeroPayment);
        assert_eq!(err.to_string(), "Invalid purchase: payment is zero");
    }

    #[test]
    fn test_token_errors_keep_their_code() {
        let token = TokenError::InsufficientAllowance {
            needed: Amount::one(),
            available: Amount::zero(),
        };
        let err = SaleError::from(token);
        assert_eq!(err.code(), token.code());
        assert_eq!(err.to_string(), token.to_string());
    }

    #[test]
    fn test_ownership_error_mapping() {
        let caller = Address::from_low_u8(3);
        assert_eq!(
            SaleError::from(OwnershipError::Unauthorized(Unauthorized { caller })),
            SaleError::Unauthorized { caller }
        );
        assert_eq!(
            SaleError::from(OwnershipError::InvalidOwner).code(),
            SALE_ERROR_INVALID_OWNER
        );
    }
}
