//! Token Ledger Error Codes
//!
//! Range: 0x0100 - 0x01FF
//! Format: TOKEN_ERROR_<SPECIFIC>

use thiserror::Error;

use crate::amount::Amount;

pub const TOKEN_ERROR_INSUFFICIENT_BALANCE: u64 = 0x0110;
pub const TOKEN_ERROR_INSUFFICIENT_ALLOWANCE: u64 = 0x0120;
pub const TOKEN_ERROR_UNSAFE_APPROVAL_CHANGE: u64 = 0x0121;
pub const TOKEN_ERROR_OVERFLOW: u64 = 0x0130;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("Insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: Amount, available: Amount },

    // Changing a nonzero allowance to another nonzero value must go through zero
    #[error("Allowance is {current}, set it to 0 before approving {requested}")]
    UnsafeApprovalChange { current: Amount, requested: Amount },

    #[error("Token amount overflow")]
    Overflow,
}

impl TokenError {
    pub fn code(&self) -> u64 {
        match self {
            Self::InsufficientBalance { .. } => TOKEN_ERROR_INSUFFICIENT_BALANCE,
            Self::InsufficientAllowance { .. } => TOKEN_ERROR_INSUFFICIENT_ALLOWANCE,
            Self::UnsafeApprovalChange { .. } => TOKEN_ERROR_UNSAFE_APPROVAL_CHANGE,
            Self::Overflow => TOKEN_ERROR_OVERFLOW,
        }
    }
}

/// Result type for token ledger operations
pub type TokenResult<T> = Result<T, TokenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TokenError::InsufficientBalance {
            needed: Amount::from(11u64),
            available: Amount::from(10u64),
        };
        assert_eq!(err.to_string(), "Insufficient balance: need 11, have 10");

        let err = TokenError::UnsafeApprovalChange {
            current: Amount::from(5u64),
            requested: Amount::from(7u64),
        };
        assert_eq!(
            err.to_string(),
            "Allowance is 5, set it to 0 before approving 7"
        );
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            TokenError::InsufficientBalance {
                needed: Amount::one(),
                available: Amount::zero(),
            },
            TokenError::InsufficientAllowance {
                needed: Amount::one(),
                available: Amount::zero(),
            },
            TokenError::UnsafeApprovalChange {
                current: Amount::one(),
                requested: Amount::one(),
            },
            TokenError::Overflow,
        ];
        let mut codes: Vec<u64> = errors.iter().map(TokenError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|code| (0x0100..0x0200).contains(code)));
    }
}
