use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::address::Address;
use crate::amount::Amount;
use crate::config::{ConfigError, SaleConfig};
use crate::sale::{CallContext, Crowdsale, NativeBank, SaleError};
use crate::time::Clock;
use crate::token::{TokenError, TokenLedger};

use super::{Call, CallError, Reply};

/// Ledger identity of the token instance ("fit.token")
pub const TOKEN_ADDRESS: Address = Address::new(*b"fit.token\0\0\0\0\0\0\0\0\0\0\0");

/// Ledger identity of the sale instance ("fit.crowdsale")
pub const SALE_ADDRESS: Address = Address::new(*b"fit.crowdsale\0\0\0\0\0\0\0");

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Sale creation failed: {0}")]
    Sale(#[from] SaleError),

    #[error("Sale allowance failed: {0}")]
    Token(#[from] TokenError),
}

/// One token, one sale selling it, the native-currency bank both settle
/// against, and the clock every call reads "now" from.
#[derive(Debug)]
pub struct Deployment<C: Clock> {
    token: TokenLedger,
    sale: Crowdsale,
    bank: NativeBank,
    clock: C,
}

impl<C: Clock> Deployment<C> {
    /// Create the token credited to `deployer`, create the sale, then have
    /// the deployer approve the sale for the funding goal.
    pub fn launch(config: &SaleConfig, deployer: Address, clock: C) -> Result<Self, LaunchError> {
        config.validate()?;

        let mut token = TokenLedger::new(deployer, config.token.clone());
        let sale = Crowdsale::new(SALE_ADDRESS, deployer, TOKEN_ADDRESS, config.sale.clone())?;
        token.approve(&deployer, sale.address(), sale.funding_goal())?;

        info!(
            "Launched {} sale by {}: {} tokens approved, window {}..={}",
            token.symbol(),
            deployer,
            sale.funding_goal(),
            sale.start_time(),
            sale.end_time()
        );

        Ok(Self {
            token,
            sale,
            bank: NativeBank::new(),
            clock,
        })
    }

    pub fn token(&self) -> &TokenLedger {
        &self.token
    }

    pub fn sale(&self) -> &Crowdsale {
        &self.sale
    }

    pub fn bank(&self) -> &NativeBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut NativeBank {
        &mut self.bank
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn token_address(&self) -> &Address {
        self.sale.token()
    }

    pub fn sale_address(&self) -> &Address {
        self.sale.address()
    }

    /// Execute `call` as `caller` with `value` attached
    pub fn dispatch(&mut self, caller: &Address, call: Call, value: Amount) -> Result<Reply, CallError> {
        let ctx = CallContext::new(*caller, self.clock.now());
        let method = call.method();

        if call.is_read_only() {
            if log::log_enabled!(log::Level::Trace) {
                trace!("Query {} from {} at {}", method, caller, ctx.now);
            }
        } else if log::log_enabled!(log::Level::Debug) {
            debug!("Dispatching {} from {} at {} with value {}", method, caller, ctx.now, value);
        }

        let result = if !value.is_zero() && !call.is_payable() {
            Err(CallError::NotPayable { method })
        } else {
            self.route(&ctx, call, value)
        };

        if let Err(e) = &result {
            warn!("Call {} from {} rejected ({:#06x}): {}", method, caller, e.code(), e);
        }
        result
    }

    fn route(&mut self, ctx: &CallContext, call: Call, value: Amount) -> Result<Reply, CallError> {
        let caller = &ctx.caller;
        let reply = match call {
            Call::Name => Reply::Text(self.token.name().to_owned()),
            Call::Symbol => Reply::Text(self.token.symbol().to_owned()),
            Call::Decimals => Reply::Number(self.token.decimals().into()),
            Call::TotalSupply => Reply::Amount(self.token.total_supply()),
            Call::BalanceOf { account } => Reply::Amount(self.token.balance_of(&account)),
            Call::Allowance { owner, spender } => Reply::Amount(self.token.allowance(&owner, &spender)),

            Call::Transfer { to, value } => Reply::Transfer(self.token.transfer(caller, &to, value)?),
            Call::Approve { spender, value } => {
                Reply::Approval(self.token.approve(caller, &spender, value)?)
            }
            Call::TransferFrom { owner, to, value } => {
                Reply::Transfer(self.token.transfer_from(caller, &owner, &to, value)?)
            }

            Call::HasEnded => Reply::Bool(self.sale.has_ended(ctx.now)),
            Call::Phase => Reply::Phase(self.sale.phase(ctx.now)),
            Call::Wallet => Reply::Address(*self.sale.wallet()),
            Call::StartTime => Reply::Number(self.sale.start_time()),
            Call::EndTime => Reply::Number(self.sale.end_time()),
            Call::Rate => Reply::Number(self.sale.rate()),
            Call::RateSoft => Reply::Number(self.sale.rate_soft()),
            Call::SoftCap => Reply::Amount(self.sale.soft_cap()),
            Call::FundingGoal => Reply::Amount(self.sale.funding_goal()),
            Call::WeiRaised => Reply::Amount(self.sale.wei_raised()),
            Call::TokensSold => Reply::Amount(self.sale.tokens_sold()),
            Call::RemainingSoftTokens => Reply::Amount(self.sale.remaining_soft_tokens()),
            Call::Owner => Reply::Address(*self.sale.owner()),
            Call::Quote { payment } => Reply::Amount(self.sale.quote(payment)?),

            Call::BuyTokens { beneficiary } => Reply::Purchase(self.sale.buy_tokens(
                ctx,
                &mut self.token,
                &mut self.bank,
                &beneficiary,
                value,
            )?),
            Call::BuyTokensForSelf => Reply::Purchase(self.sale.buy_tokens_for_self(
                ctx,
                &mut self.token,
                &mut self.bank,
                value,
            )?),

            Call::SetStart { time } => {
                self.sale.set_start(caller, time)?;
                Reply::Done
            }
            Call::SetEnd { time } => {
                self.sale.set_end(caller, time)?;
                Reply::Done
            }
            Call::TransferOwnership { new_owner } => {
                Reply::OwnershipTransferred(self.sale.transfer_ownership(caller, new_owner)?)
            }
        };
        Ok(reply)
    }
}
