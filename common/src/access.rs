//! Owner capability
//!
//! The sale only asks one question of its access-control collaborator:
//! "does this caller hold the owner capability?". `ensure_owner` is the
//! single guard every owner-only operation runs first.

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Caller {caller} is not the owner")]
pub struct Unauthorized {
    pub caller: Address,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum OwnershipError {
    #[error(transparent)]
    Unauthorized(#[from] Unauthorized),

    #[error("New owner cannot be the null address")]
    InvalidOwner,
}

pub trait AccessControl {
    /// Whether `account` currently holds the owner capability
    fn is_owner(&self, account: &Address) -> bool;

    fn ensure_owner(&self, caller: &Address) -> Result<(), Unauthorized> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(Unauthorized { caller: *caller })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferred {
    pub previous: Address,
    pub new: Address,
}

/// Single-owner access control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Hand the owner capability to `new_owner`
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<OwnershipTransferred, OwnershipError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(OwnershipError::InvalidOwner);
        }

        let record = OwnershipTransferred {
            previous: self.owner,
            new: new_owner,
        };
        self.owner = new_owner;
        info!("Ownership transferred from {} to {}", record.previous, record.new);
        Ok(record)
    }
}

impl AccessControl for Ownable {
    fn is_owner(&self, account: &Address) -> bool {
        self.owner == *account
    }
}
