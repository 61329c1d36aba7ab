// FIT Crowdsale Simulator
//
// Replays a scripted sequence of calls against an in-memory FIT token and
// crowdsale, printing one JSON line per step and a final summary.
//
// Usage:
//   fit_simulator --script scenarios/mainnet_sale.json
//   fit_simulator --config scenarios/fit_mainnet_config.json --script scenarios/token_allowance.json
//   fit_simulator --config sale.json --script calls.json --log-level debug

mod replay;
mod script;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use serde_json::json;

use fit_common::address::Address;
use fit_common::call::Deployment;
use fit_common::config::SaleConfig;
use fit_common::time::ManualClock;

use crate::replay::Replay;
use crate::script::Script;

#[derive(Parser, Debug)]
#[command(name = "fit_simulator")]
#[command(about = "Replay scripted calls against an in-memory FIT crowdsale")]
struct Args {
    /// Deployment config (JSON); the FIT mainnet parameters when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Call script to replay (JSON)
    #[arg(short, long)]
    script: PathBuf,

    /// Account deploying the token and the sale
    #[arg(short, long, default_value = "0x0000000000000000000000000000000000000001")]
    deployer: Address,

    /// Log filter, overridden by RUST_LOG
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Exit with an error when a step misses its expectation
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let config = match &args.config {
        Some(path) => SaleConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SaleConfig::default(),
    };
    let script = Script::load(&args.script)?;

    let start = script
        .steps
        .iter()
        .find_map(|step| step.at)
        .unwrap_or(config.sale.start_time);
    let deployment = Deployment::launch(&config, args.deployer, ManualClock::new(start))
        .context("Failed to launch deployment")?;

    info!(
        "Replaying {} steps against {} (sale {})",
        script.steps.len(),
        deployment.token_address(),
        deployment.sale_address()
    );

    let mut replay = Replay::new(deployment);
    replay.run(&script)?;

    for outcome in replay.outcomes() {
        println!("{}", serde_json::to_string(outcome)?);
    }
    let summary = replay.summary();
    println!("{}", json!({ "summary": summary }));

    if args.strict && summary.unexpected > 0 {
        bail!("{} step(s) did not meet their expectation", summary.unexpected);
    }
    if !summary.supply_conserved {
        bail!("Token balances no longer add up to the total supply");
    }
    Ok(())
}
