use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Serialize;

use fit_common::address::Address;
use fit_common::amount::{self, Amount};
use fit_common::call::{Deployment, Reply};
use fit_common::time::{Clock, ManualClock, TimestampSeconds};

use crate::script::{Expect, Script, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepError {
    pub code: u64,
    pub message: String,
}

/// One output line per replayed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub at: TimestampSeconds,
    pub caller: Address,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
    /// False when the step carried an expectation it did not meet
    pub as_expected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub steps: usize,
    pub failed: usize,
    pub unexpected: usize,
    #[serde(with = "amount::dec_string")]
    pub wei_raised: Amount,
    #[serde(with = "amount::dec_string")]
    pub tokens_sold: Amount,
    #[serde(with = "amount::dec_string")]
    pub wallet_balance: Amount,
    pub supply_conserved: bool,
}

pub struct Replay {
    deployment: Deployment<ManualClock>,
    outcomes: Vec<StepOutcome>,
}

impl Replay {
    pub fn new(deployment: Deployment<ManualClock>) -> Self {
        Self {
            deployment,
            outcomes: Vec::new(),
        }
    }

    pub fn deployment(&self) -> &Deployment<ManualClock> {
        &self.deployment
    }

    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Credit the script's payers, then run every step in order
    pub fn run(&mut self, script: &Script) -> Result<()> {
        for funding in &script.funding {
            self.deployment
                .bank_mut()
                .deposit(&funding.account, funding.amount)
                .with_context(|| format!("Failed to fund {}", funding.account))?;
            if log::log_enabled!(log::Level::Debug) {
                debug!("Funded {} with {}", funding.account, funding.amount);
            }
        }

        for step in &script.steps {
            self.step(step);
        }
        Ok(())
    }

    pub fn step(&mut self, step: &Step) -> &StepOutcome {
        let index = self.outcomes.len();
        if let Some(at) = step.at {
            self.deployment.clock().set(at);
        }
        let value = step.value();
        let at = self.deployment.clock().now();

        let (reply, error) = match self.deployment.dispatch(&step.caller, step.call.clone(), value) {
            Ok(reply) => (Some(reply), None),
            Err(e) => (
                None,
                Some(StepError {
                    code: e.code(),
                    message: e.to_string(),
                }),
            ),
        };

        let as_expected = match (step.expect, &error) {
            (None, _) => true,
            (Some(Expect::Ok), error) => error.is_none(),
            (Some(Expect::Error(code)), Some(error)) => error.code == code,
            (Some(Expect::Error(_)), None) => false,
        };
        if !as_expected {
            warn!("Step {} ({}) did not meet its expectation", index, step.call.method());
        }

        self.outcomes.push(StepOutcome {
            step: index,
            at,
            caller: step.caller,
            method: step.call.method(),
            reply,
            error,
            as_expected,
        });
        &self.outcomes[index]
    }

    pub fn summary(&self) -> Summary {
        let sale = self.deployment.sale();
        let token = self.deployment.token();
        let summary = Summary {
            steps: self.outcomes.len(),
            failed: self.outcomes.iter().filter(|o| o.error.is_some()).count(),
            unexpected: self.outcomes.iter().filter(|o| !o.as_expected).count(),
            wei_raised: sale.wei_raised(),
            tokens_sold: sale.tokens_sold(),
            wallet_balance: self.deployment.bank().balance_of(sale.wallet()),
            supply_conserved: token.sum_of_balances() == Some(token.total_supply()),
        };
        info!(
            "Replayed {} steps ({} failed), raised {}, sold {}",
            summary.steps, summary.failed, summary.wei_raised, summary.tokens_sold
        );
        summary
    }
}
