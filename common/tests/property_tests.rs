//! Property-based tests for the token ledger and the sale
//!
//! Properties tested:
//! - Supply conservation under arbitrary transfers, approvals and purchases
//! - Monotonic sale counters
//! - Rejected calls leave every observable value unchanged
//! - Tier split matches a unit-by-unit reference computation

use proptest::prelude::*;

use fit_common::address::Address;
use fit_common::amount::Amount;
use fit_common::call::{Call, Deployment, SALE_ADDRESS};
use fit_common::config::SaleConfig;
use fit_common::sale::pricing::tiered_token_amount;
use fit_common::sale::SaleParams;
use fit_common::time::ManualClock;
use fit_common::token::{TokenLedger, TokenMetadata};

const ACCOUNTS: u8 = 5;
const START: u64 = 100;
const END: u64 = 200;

fn account(index: u8) -> Address {
    Address::from_low_u8(index + 1)
}

/// Small numbers so operations hit both the success and failure paths
fn small_config() -> SaleConfig {
    SaleConfig {
        token: TokenMetadata {
            total_supply: Amount::from(1_000_000u64),
            ..TokenMetadata::default()
        },
        sale: SaleParams {
            wallet: Address::from_low_u8(0xcc),
            start_time: START,
            end_time: END,
            rate: 10,
            rate_soft: 12,
            soft_cap: Amount::from(5_000u64),
            funding_goal: Amount::from(50_000u64),
        },
    }
}

#[derive(Debug, Clone)]
enum Op {
    Transfer { from: u8, to: u8, value: u64 },
    Approve { owner: u8, spender: u8, value: u64 },
    TransferFrom { spender: u8, owner: u8, to: u8, value: u64 },
    Buy { buyer: u8, payment: u64, at: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let index = 0..ACCOUNTS;
    prop_oneof![
        (index.clone(), index.clone(), 0u64..2_000)
            .prop_map(|(from, to, value)| Op::Transfer { from, to, value }),
        (index.clone(), index.clone(), 0u64..2_000)
            .prop_map(|(owner, spender, value)| Op::Approve { owner, spender, value }),
        (index.clone(), index.clone(), index.clone(), 0u64..2_000)
            .prop_map(|(spender, owner, to, value)| Op::TransferFrom { spender, owner, to, value }),
        (index, 0u64..600, 50u64..250)
            .prop_map(|(buyer, payment, at)| Op::Buy { buyer, payment, at }),
    ]
}

fn to_call(op: &Op) -> (Address, Call, Amount) {
    match *op {
        Op::Transfer { from, to, value } => (
            account(from),
            Call::Transfer {
                to: account(to),
                value: value.into(),
            },
            Amount::zero(),
        ),
        Op::Approve { owner, spender, value } => (
            account(owner),
            Call::Approve {
                spender: account(spender),
                value: value.into(),
            },
            Amount::zero(),
        ),
        Op::TransferFrom { spender, owner, to, value } => (
            account(spender),
            Call::TransferFrom {
                owner: account(owner),
                to: account(to),
                value: value.into(),
            },
            Amount::zero(),
        ),
        Op::Buy { buyer, payment, .. } => (account(buyer), Call::BuyTokensForSelf, payment.into()),
    }
}

/// Everything a call could possibly change
#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    balances: Vec<Amount>,
    allowances: Vec<Amount>,
    funds: Vec<Amount>,
    wei_raised: Amount,
    tokens_sold: Amount,
    token_events: usize,
    sale_events: usize,
}

fn snapshot(deployment: &Deployment<ManualClock>) -> Snapshot {
    let token = deployment.token();
    let mut holders: Vec<Address> = (0..ACCOUNTS).map(account).collect();
    holders.push(SALE_ADDRESS);

    let balances = holders.iter().map(|a| token.balance_of(a)).collect();
    let allowances = holders
        .iter()
        .flat_map(|owner| holders.iter().map(move |spender| (*owner, *spender)))
        .map(|(owner, spender)| token.allowance(&owner, &spender))
        .collect();
    let mut funds: Vec<Amount> = holders
        .iter()
        .map(|a| deployment.bank().balance_of(a))
        .collect();
    funds.push(deployment.bank().balance_of(deployment.sale().wallet()));

    Snapshot {
        balances,
        allowances,
        funds,
        wei_raised: deployment.sale().wei_raised(),
        tokens_sold: deployment.sale().tokens_sold(),
        token_events: token.events().len(),
        sale_events: deployment.sale().events().len(),
    }
}

/// Reference pricing: walk the payment one unit at a time
fn reference_tokens(payment: u64, tokens_sold: u64, soft_cap: u64, rate_soft: u64, rate: u64) -> u64 {
    let remaining_soft = soft_cap.saturating_sub(tokens_sold);
    if payment * rate_soft <= remaining_soft {
        return payment * rate_soft;
    }
    let mut soft_units = 0;
    while (soft_units + 1) * rate_soft <= remaining_soft {
        soft_units += 1;
    }
    remaining_soft + (payment - soft_units) * rate
}

proptest! {
    #[test]
    fn test_supply_is_conserved(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let config = small_config();
        let deployer = account(0);
        let mut deployment = Deployment::launch(&config, deployer, ManualClock::new(0)).unwrap();
        for index in 0..ACCOUNTS {
            deployment.bank_mut().deposit(&account(index), Amount::from(10_000u64)).unwrap();
        }
        let funds_total = deployment.bank().total();

        let mut previous_raised = Amount::zero();
        let mut previous_sold = Amount::zero();
        for op in &ops {
            if let Op::Buy { at, .. } = op {
                deployment.clock().set(*at);
            }
            let (caller, call, value) = to_call(op);
            let _ = deployment.dispatch(&caller, call, value);

            let token = deployment.token();
            prop_assert_eq!(token.sum_of_balances(), Some(token.total_supply()));
            prop_assert_eq!(deployment.bank().total(), funds_total);

            let sale = deployment.sale();
            prop_assert!(sale.wei_raised() >= previous_raised);
            prop_assert!(sale.tokens_sold() >= previous_sold);
            previous_raised = sale.wei_raised();
            previous_sold = sale.tokens_sold();
        }

        // Every accepted payment ended up in the wallet
        let sale = deployment.sale();
        prop_assert_eq!(
            deployment.bank().balance_of(sale.wallet()),
            sale.wei_raised()
        );
    }

    #[test]
    fn test_rejected_calls_change_nothing(
        setup in prop::collection::vec(op_strategy(), 0..20),
        probe in op_strategy(),
    ) {
        let config = small_config();
        let mut deployment = Deployment::launch(&config, account(0), ManualClock::new(START)).unwrap();
        for index in 0..ACCOUNTS {
            deployment.bank_mut().deposit(&account(index), Amount::from(1_000u64)).unwrap();
        }
        for op in &setup {
            let (caller, call, value) = to_call(op);
            let _ = deployment.dispatch(&caller, call, value);
        }

        if let Op::Buy { at, .. } = probe {
            deployment.clock().set(at);
        }
        let before = snapshot(&deployment);
        let (caller, call, value) = to_call(&probe);
        if deployment.dispatch(&caller, call, value).is_err() {
            prop_assert_eq!(snapshot(&deployment), before);
        }
    }

    #[test]
    fn test_tier_split_matches_reference(
        payment in 0u64..10_000,
        tokens_sold in 0u64..200_000,
        soft_cap in 0u64..150_000,
        rate_soft in 1u64..50,
        rate in 1u64..50,
    ) {
        let tokens = tiered_token_amount(
            payment.into(),
            tokens_sold.into(),
            soft_cap.into(),
            rate_soft.into(),
            rate.into(),
        );
        let expected = reference_tokens(payment, tokens_sold, soft_cap, rate_soft, rate);
        prop_assert_eq!(tokens, Some(Amount::from(expected)));
    }

    #[test]
    fn test_soft_cap_boundary(remaining_units in 1u64..1_000, rate_soft in 2u64..100, rate in 1u64..100) {
        let soft_cap = Amount::from(remaining_units * rate_soft);
        let exact = tiered_token_amount(
            remaining_units.into(),
            Amount::zero(),
            soft_cap,
            rate_soft.into(),
            rate.into(),
        );
        prop_assert_eq!(exact, Some(soft_cap));

        let one_more = tiered_token_amount(
            (remaining_units + 1).into(),
            Amount::zero(),
            soft_cap,
            rate_soft.into(),
            rate.into(),
        );
        prop_assert_eq!(one_more, Some(soft_cap + Amount::from(rate)));
    }

    #[test]
    fn test_approval_race_rule(first in 1u64..u64::MAX, second in 1u64..u64::MAX) {
        let owner = account(0);
        let spender = account(1);
        let mut ledger = TokenLedger::new(owner, TokenMetadata::default());
        ledger.approve(&owner, &spender, first.into()).unwrap();
        prop_assert!(ledger.approve(&owner, &spender, second.into()).is_err());
        prop_assert_eq!(ledger.allowance(&owner, &spender), Amount::from(first));
        ledger.approve(&owner, &spender, Amount::zero()).unwrap();
        ledger.approve(&owner, &spender, second.into()).unwrap();
        prop_assert_eq!(ledger.allowance(&owner, &spender), Amount::from(second));
    }
}
