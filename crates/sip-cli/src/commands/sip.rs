use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use sip_core::sip::{self, AllocationBasis, PlanInput, ValidationPolicy};
use sip_core::types::round_money;

use crate::input;

/// Weighting used for the allocation breakdown
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum BasisArg {
    #[default]
    Invested,
    FutureValue,
}

impl From<BasisArg> for AllocationBasis {
    fn from(b: BasisArg) -> Self {
        match b {
            BasisArg::Invested => AllocationBasis::Invested,
            BasisArg::FutureValue => AllocationBasis::FutureValue,
        }
    }
}

/// Arguments for valuing a list of plans
#[derive(Args)]
pub struct ComputeArgs {
    /// Path to a plan file (.json, .yaml or .csv); JSON on stdin otherwise
    #[arg(long)]
    pub input: Option<String>,

    /// Drop invalid or overflowing plans instead of failing the whole run
    #[arg(long)]
    pub skip_invalid: bool,

    /// Amount that weights the allocation breakdown
    #[arg(long, value_enum, default_value = "invested")]
    pub basis: BasisArg,

    /// Emit only the totals summary
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for valuing a single plan given on the command line
#[derive(Args)]
pub struct FutureValueArgs {
    /// Amount contributed each month
    #[arg(long)]
    pub monthly_amount: Decimal,

    /// Expected annual return in percent (e.g. 12 for 12%)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Decimal,

    /// Duration in years
    #[arg(long)]
    pub years: Decimal,

    /// Fund name
    #[arg(long, default_value = "")]
    pub name: String,
}

#[derive(Debug, Serialize)]
struct SummaryOutput {
    total_invested: Decimal,
    total_returns: Decimal,
    total_future_value: Decimal,
    return_pct: Option<Decimal>,
    wealth_multiple_pct: Option<Decimal>,
}

fn load_plans(args: &ComputeArgs) -> Result<Vec<PlanInput>, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        input::file::read_plans(path)
    } else if let Some(plans) = input::stdin::read_stdin_plans()? {
        Ok(plans)
    } else {
        Err("--input <plans.json|.yaml|.csv> or stdin required for compute".into())
    }
}

pub fn run_compute(args: ComputeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plans = load_plans(&args)?;
    let policy = if args.skip_invalid {
        ValidationPolicy::Skip
    } else {
        ValidationPolicy::Abort
    };
    debug!(plans = plans.len(), ?policy, "computing plans");

    let output = sip::compute_with_policy(&plans, policy, args.basis.into())?;
    for pos in &output.result.skipped {
        warn!(position = pos + 1, "plan skipped");
    }

    if args.summary {
        let totals = output.result.totals.rounded();
        let summary = SummaryOutput {
            total_invested: totals.total_invested,
            total_returns: totals.total_returns,
            total_future_value: totals.total_future_value,
            return_pct: output.result.return_pct.map(round_money),
            wealth_multiple_pct: output.result.wealth_multiple_pct.map(round_money),
        };
        let mut value = serde_json::to_value(&output)?;
        value["result"] = serde_json::to_value(summary)?;
        return Ok(value);
    }

    Ok(serde_json::to_value(output)?)
}

pub fn run_future_value(args: FutureValueArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let plan = PlanInput::new(args.name, args.monthly_amount, args.rate, args.years);
    let output = sip::compute_with_policy(
        std::slice::from_ref(&plan),
        ValidationPolicy::Abort,
        AllocationBasis::Invested,
    )?;
    Ok(serde_json::to_value(output)?)
}
