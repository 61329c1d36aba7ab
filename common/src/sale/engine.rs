use log::{debug, info};

use crate::access::{AccessControl, OwnershipTransferred, Ownable};
use crate::address::Address;
use crate::amount::{format_units, Amount, ETHER_DECIMALS, TOKEN_DECIMALS};
use crate::events::EventLog;
use crate::time::TimestampSeconds;
use crate::token::{LedgerOverlay, TokenLedger};

use super::{
    pricing, CallContext, FundsForwarder, PurchaseRejection, SaleError, SaleEvent, SaleParams,
    SalePhase, SaleResult, TokenPurchase,
};

/// Crowdsale state machine
///
/// The phase is never stored: it is derived from the window and the clock
/// reading passed with each call.
#[derive(Debug, Clone)]
pub struct Crowdsale {
    /// Identity of the sale on the token ledger (the allowance spender)
    address: Address,
    token: Address,
    /// Account whose allowance to the sale backs every purchase
    token_holder: Address,
    params: SaleParams,
    access: Ownable,
    wei_raised: Amount,
    tokens_sold: Amount,
    events: EventLog<SaleEvent>,
}

impl Crowdsale {
    pub fn new(
        address: Address,
        deployer: Address,
        token: Address,
        params: SaleParams,
    ) -> SaleResult<Self> {
        params.validate()?;

        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Crowdsale {} created by {} for token {}, window {}..={}",
                address, deployer, token, params.start_time, params.end_time
            );
        }

        Ok(Self {
            address,
            token,
            token_holder: deployer,
            params,
            access: Ownable::new(deployer),
            wei_raised: Amount::zero(),
            tokens_sold: Amount::zero(),
            events: EventLog::new(),
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn token(&self) -> &Address {
        &self.token
    }

    pub fn token_holder(&self) -> &Address {
        &self.token_holder
    }

    pub fn params(&self) -> &SaleParams {
        &self.params
    }

    pub fn wallet(&self) -> &Address {
        &self.params.wallet
    }

    pub fn start_time(&self) -> TimestampSeconds {
        self.params.start_time
    }

    pub fn end_time(&self) -> TimestampSeconds {
        self.params.end_time
    }

    pub fn rate(&self) -> u64 {
        self.params.rate
    }

    pub fn rate_soft(&self) -> u64 {
        self.params.rate_soft
    }

    pub fn soft_cap(&self) -> Amount {
        self.params.soft_cap
    }

    pub fn funding_goal(&self) -> Amount {
        self.params.funding_goal
    }

    pub fn wei_raised(&self) -> Amount {
        self.wei_raised
    }

    pub fn tokens_sold(&self) -> Amount {
        self.tokens_sold
    }

    pub fn owner(&self) -> &Address {
        self.access.owner()
    }

    pub fn events(&self) -> &EventLog<SaleEvent> {
        &self.events
    }

    pub fn phase(&self, now: TimestampSeconds) -> SalePhase {
        if now < self.params.start_time {
            SalePhase::NotStarted
        } else if now > self.params.end_time {
            SalePhase::Ended
        } else {
            SalePhase::Open
        }
    }

    pub fn has_ended(&self, now: TimestampSeconds) -> bool {
        now > self.params.end_time
    }

    /// Inside the window with a nonzero payment
    pub fn valid_purchase(&self, now: TimestampSeconds, payment: Amount) -> bool {
        self.phase(now) == SalePhase::Open && !payment.is_zero()
    }

    pub fn remaining_soft_tokens(&self) -> Amount {
        pricing::remaining_soft_tokens(self.tokens_sold, self.params.soft_cap)
    }

    /// Tokens `payment` would buy right now
    pub fn quote(&self, payment: Amount) -> SaleResult<Amount> {
        pricing::tiered_token_amount(
            payment,
            self.tokens_sold,
            self.params.soft_cap,
            Amount::from(self.params.rate_soft),
            Amount::from(self.params.rate),
        )
        .ok_or(SaleError::Overflow)
    }

    // ========================================
    // Purchases
    // ========================================

    /// Sell tokens to `beneficiary` against `payment` sent by the caller.
    ///
    /// The token pull is staged first and committed only once `funds` has
    /// forwarded the payment to the wallet, so a failure at any step leaves
    /// the ledger, the funds and the counters as they were.
    pub fn buy_tokens<F: FundsForwarder + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut TokenLedger,
        funds: &mut F,
        beneficiary: &Address,
        payment: Amount,
    ) -> SaleResult<TokenPurchase> {
        if beneficiary.is_zero() {
            return Err(SaleError::InvalidPurchase(PurchaseRejection::NullBeneficiary));
        }
        if self.phase(ctx.now) != SalePhase::Open {
            return Err(SaleError::SaleNotActive {
                now: ctx.now,
                start: self.params.start_time,
                end: self.params.end_time,
            });
        }
        if payment.is_zero() {
            return Err(SaleError::InvalidPurchase(PurchaseRejection::ZeroPayment));
        }

        let tokens = self.quote(payment)?;
        let wei_raised = self
            .wei_raised
            .checked_add(payment)
            .ok_or(SaleError::Overflow)?;
        let tokens_sold = self
            .tokens_sold
            .checked_add(tokens)
            .ok_or(SaleError::Overflow)?;

        let mut overlay = LedgerOverlay::new();
        token.stage_transfer_from(
            &mut overlay,
            &self.address,
            &self.token_holder,
            beneficiary,
            tokens,
        )?;

        // Last fallible step
        funds.forward(&ctx.caller, &self.params.wallet, payment)?;

        token.commit(overlay);
        self.wei_raised = wei_raised;
        self.tokens_sold = tokens_sold;

        let record = TokenPurchase {
            purchaser: ctx.caller,
            beneficiary: *beneficiary,
            value: payment,
            amount: tokens,
        };
        self.events.push(SaleEvent::TokenPurchase(record));

        info!(
            "Purchase by {} for {}: paid {}, received {} tokens",
            record.purchaser,
            record.beneficiary,
            format_units(record.value, ETHER_DECIMALS),
            format_units(record.amount, TOKEN_DECIMALS)
        );
        Ok(record)
    }

    /// Purchase with the caller as beneficiary
    pub fn buy_tokens_for_self<F: FundsForwarder + ?Sized>(
        &mut self,
        ctx: &CallContext,
        token: &mut TokenLedger,
        funds: &mut F,
        payment: Amount,
    ) -> SaleResult<TokenPurchase> {
        let beneficiary = ctx.caller;
        self.buy_tokens(ctx, token, funds, &beneficiary, payment)
    }

    // ========================================
    // Owner operations
    // ========================================

    pub fn set_start(&mut self, caller: &Address, start_time: TimestampSeconds) -> SaleResult<()> {
        self.ensure_owner(caller)?;
        info!(
            "Sale start moved from {} to {} by {}",
            self.params.start_time, start_time, caller
        );
        self.params.start_time = start_time;
        Ok(())
    }

    pub fn set_end(&mut self, caller: &Address, end_time: TimestampSeconds) -> SaleResult<()> {
        self.ensure_owner(caller)?;
        info!(
            "Sale end moved from {} to {} by {}",
            self.params.end_time, end_time, caller
        );
        self.params.end_time = end_time;
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> SaleResult<OwnershipTransferred> {
        let record = self.access.transfer_ownership(caller, new_owner)?;
        self.events.push(SaleEvent::OwnershipTransferred(record));
        Ok(record)
    }
}

impl AccessControl for Crowdsale {
    fn is_owner(&self, account: &Address) -> bool {
        self.access.is_owner(account)
    }
}
