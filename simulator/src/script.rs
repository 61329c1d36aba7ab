// Call script format
//
// {
//   "funding": [{ "account": "0x..", "amount": "1000000000000000000" }],
//   "steps": [
//     { "at": 1512381700, "caller": "0x..", "value": "1000", "call": { "type": "buy_tokens_for_self" }, "expect": "ok" }
//   ]
// }
//
// Amounts are decimal strings of base units. `at` and `value` are optional:
// without `at` the clock keeps its previous reading, without `value` nothing
// is attached. `expect` is either "ok" or { "error": <code> }.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fit_common::address::Address;
use fit_common::amount::{self, Amount};
use fit_common::call::Call;
use fit_common::time::TimestampSeconds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Funding {
    pub account: Address,
    #[serde(with = "amount::dec_string")]
    pub amount: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    Ok,
    Error(u64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub at: Option<TimestampSeconds>,
    pub caller: Address,
    #[serde(default, with = "amount::dec_string::option")]
    pub value: Option<Amount>,
    pub call: Call,
    #[serde(default)]
    pub expect: Option<Expect>,
}

impl Step {
    /// Attached value, zero when the step carries none
    pub fn value(&self) -> Amount {
        self.value.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub funding: Vec<Funding>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse call script")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script file: {}", path.display()))?;
        Self::from_json_str(&content)
    }
}
