use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SipError;
use crate::sip::allocation::{allocate_at, AllocationBasis, AllocationSlice};
use crate::sip::plan::{PlanInput, PlanResult, Totals};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::SipResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-plan results in input order plus their totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SipOutput {
    pub results: Vec<PlanResult>,
    pub totals: Totals,
}

/// What to do with plans that fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Fail the whole computation on the first invalid plan.
    #[default]
    Abort,
    /// Drop plans that are invalid or whose values overflow, report their
    /// positions and carry on.
    Skip,
}

/// Full report returned by [`compute_with_policy`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SipReport {
    pub results: Vec<PlanResult>,
    pub totals: Totals,
    pub allocation: Vec<AllocationSlice>,
    pub allocation_basis: AllocationBasis,
    /// Input positions (0-based) of plans dropped under `ValidationPolicy::Skip`,
    /// either invalid or overflowing.
    pub skipped: Vec<usize>,
    /// `total_returns / total_invested * 100`.
    pub return_pct: Option<Decimal>,
    /// `total_future_value / total_invested * 100`.
    pub wealth_multiple_pct: Option<Decimal>,
}

#[derive(Serialize)]
struct Assumptions {
    contribution_timing: &'static str,
    compounding: &'static str,
    validation_policy: ValidationPolicy,
    allocation_basis: AllocationBasis,
    plan_count: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Compute (1 + r)^n by exponentiation by squaring, failing instead of
/// panicking on overflow. Runs in O(log n) multiplications.
fn compound(rate: Rate, n: u32) -> SipResult<Decimal> {
    let overflowed = || SipError::Overflow {
        context: format!("compounding over {n} months"),
    };
    let mut base = Decimal::ONE + rate;
    let mut exp = n;
    let mut result = Decimal::ONE;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(base).ok_or_else(overflowed)?;
        }
        exp >>= 1;
        // base^(2^k) never exceeds base^n, so only squares that are used get taken
        if exp > 0 {
            base = base.checked_mul(base).ok_or_else(overflowed)?;
        }
    }
    Ok(result)
}

fn overflow(context: &str) -> SipError {
    SipError::Overflow {
        context: context.into(),
    }
}

/// `part / whole * 100`; `whole` must be non-zero.
fn pct_of(part: Money, whole: Money) -> SipResult<Decimal> {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(100)))
        .ok_or_else(|| overflow("summary percentage"))
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Future value of `months` contributions of `monthly_amount`, each made at
/// the start of its month (annuity-due):
///
/// `P * (((1 + r)^n - 1) / r) * (1 + r)` with `r = annual_rate_percent / 1200`.
///
/// At `r == 0` this is exactly `P * n`.
pub fn future_value(
    monthly_amount: Money,
    annual_rate_percent: Rate,
    months: u32,
) -> SipResult<Money> {
    let n = Decimal::from(months);
    let r = annual_rate_percent / Decimal::from(12) / Decimal::from(100);

    if r.is_zero() {
        return monthly_amount
            .checked_mul(n)
            .ok_or_else(|| overflow("contribution total"));
    }

    let growth = compound(r, months)?;
    let annuity_factor = (growth - Decimal::ONE)
        .checked_div(r)
        .ok_or_else(|| overflow("annuity factor"))?;
    monthly_amount
        .checked_mul(annuity_factor)
        .and_then(|v| v.checked_mul(Decimal::ONE + r))
        .ok_or_else(|| overflow("future value"))
}

fn value_plan(plan: &PlanInput, index: usize) -> SipResult<PlanResult> {
    plan.validate(index)?;
    let months = plan.months().ok_or_else(|| overflow("month count"))?;

    let fv = future_value(plan.monthly_amount, plan.annual_rate_percent, months)?;
    let invested_amount = plan
        .monthly_amount
        .checked_mul(Decimal::from(months))
        .ok_or_else(|| overflow("invested amount"))?;

    Ok(PlanResult {
        name: plan.name.clone(),
        months,
        invested_amount,
        future_value: fv,
        estimated_returns: fv - invested_amount,
    })
}

/// Validate and value a single plan.
pub fn project_plan(plan: &PlanInput) -> SipResult<PlanResult> {
    value_plan(plan, 0)
}

/// Value every plan in input order and total the results.
///
/// Fails on the first invalid plan. An empty list is valid and yields no
/// results with all-zero totals.
pub fn compute(plans: &[PlanInput]) -> SipResult<SipOutput> {
    let results = plans
        .iter()
        .enumerate()
        .map(|(i, plan)| value_plan(plan, i))
        .collect::<SipResult<Vec<_>>>()?;
    let totals = Totals::from_results(&results)?;
    Ok(SipOutput { results, totals })
}

/// Value every plan under the given validation policy and wrap the report,
/// with its allocation breakdown, in the standard output envelope.
pub fn compute_with_policy(
    plans: &[PlanInput],
    policy: ValidationPolicy,
    basis: AllocationBasis,
) -> SipResult<ComputationOutput<SipReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut results = Vec::with_capacity(plans.len());
    let mut positions = Vec::with_capacity(plans.len());
    let mut skipped = Vec::new();

    for (i, plan) in plans.iter().enumerate() {
        match value_plan(plan, i) {
            Ok(result) => {
                if plan.has_partial_month() {
                    warnings.push(format!(
                        "Plan {} duration of {} years truncated to {} whole months",
                        i + 1,
                        plan.duration_years,
                        result.months
                    ));
                }
                results.push(result);
                positions.push(i);
            }
            Err(e @ (SipError::InvalidPlanInput { .. } | SipError::Overflow { .. }))
                if policy == ValidationPolicy::Skip =>
            {
                warnings.push(format!("Skipped plan {}: {e}", i + 1));
                skipped.push(i);
            }
            Err(e) => return Err(e),
        }
    }

    if plans.is_empty() {
        warnings.push("No plans supplied; totals are zero".into());
    }

    let totals = Totals::from_results(&results)?;
    let allocation = allocate_at(&results, positions, basis)?;

    let (return_pct, wealth_multiple_pct) = if totals.total_invested.is_zero() {
        (None, None)
    } else {
        (
            Some(pct_of(totals.total_returns, totals.total_invested)?),
            Some(pct_of(totals.total_future_value, totals.total_invested)?),
        )
    };

    let assumptions = Assumptions {
        contribution_timing: "start_of_month",
        compounding: "monthly",
        validation_policy: policy,
        allocation_basis: basis,
        plan_count: plans.len(),
    };

    let report = SipReport {
        results,
        totals,
        allocation,
        allocation_basis: basis,
        skipped,
        return_pct,
        wealth_multiple_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SIP future value (annuity-due, monthly compounding)",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn plan(name: &str, amount: Decimal, rate: Decimal, years: Decimal) -> PlanInput {
        PlanInput::new(name, amount, rate, years)
    }

    #[test]
    fn test_compound_basic() {
        assert_eq!(compound(dec!(0.10), 2).unwrap(), dec!(1.21));
        assert_eq!(compound(dec!(0.05), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_compound_overflow_is_error() {
        assert!(matches!(
            compound(dec!(10), 1000),
            Err(SipError::Overflow { .. })
        ));
    }

    #[test]
    fn test_compound_matches_repeated_multiplication() {
        let mut expected = Decimal::ONE;
        for _ in 0..37 {
            expected *= dec!(1.0075);
        }
        let got = compound(dec!(0.0075), 37).unwrap();
        assert!((got - expected).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_compound_full_month_range_is_fast_for_shrinking_rate() {
        let start = Instant::now();
        let fv = future_value(dec!(1), dec!(-12), u32::MAX).unwrap();
        // (0.99)^n vanishes, leaving 1 * (1 / 0.01) * 0.99
        assert!((fv - dec!(99)).abs() < dec!(0.0001), "got {fv}");
        assert!(start.elapsed().as_secs() < 1);
    }

    #[test]
    fn test_future_value_annuity_factor_overflow_is_error() {
        // (1 + r)^n fits but dividing by the tiny monthly rate does not
        assert!(matches!(
            future_value(dec!(1), dec!(0.012), 6_480_000),
            Err(SipError::Overflow { .. })
        ));
    }

    #[test]
    fn test_compute_with_policy_skips_overflowing_plan() {
        let plans = vec![
            plan("ok", dec!(1000), dec!(8), dec!(2)),
            plan("long", dec!(1), dec!(0.012), dec!(540000)),
        ];
        let out = compute_with_policy(&plans, ValidationPolicy::Skip, AllocationBasis::Invested)
            .unwrap();
        assert_eq!(out.result.skipped, vec![1]);
        assert_eq!(out.result.results.len(), 1);
        assert!(out.warnings[0].starts_with("Skipped plan 2: Arithmetic overflow"));

        assert!(matches!(
            compute_with_policy(&plans, ValidationPolicy::Abort, AllocationBasis::Invested),
            Err(SipError::Overflow { .. })
        ));
    }

    #[test]
    fn test_future_value_reference_case() {
        let fv = future_value(dec!(5000), dec!(10), 120).unwrap();
        assert!(
            (fv - dec!(1022136.32)).abs() < dec!(0.5),
            "Expected FV ~1022136.32, got {fv}"
        );
    }

    #[test]
    fn test_future_value_zero_rate_is_exact() {
        assert_eq!(future_value(dec!(1000), dec!(0), 24).unwrap(), dec!(24000));
    }

    #[test]
    fn test_future_value_single_month_at_twelve_percent() {
        // one contribution at the start of the month earns one month at 1%
        assert_eq!(future_value(dec!(100), dec!(12), 1).unwrap(), dec!(101));
    }

    #[test]
    fn test_future_value_negative_rate_below_invested() {
        let fv = future_value(dec!(1000), dec!(-6), 60).unwrap();
        assert!(fv < dec!(60000));
        assert!(fv > Decimal::ZERO);
    }

    #[test]
    fn test_project_plan_fields() {
        let r = project_plan(&plan("Bluechip", dec!(5000), dec!(10), dec!(10))).unwrap();
        assert_eq!(r.name, "Bluechip");
        assert_eq!(r.months, 120);
        assert_eq!(r.invested_amount, dec!(600000));
        assert_eq!(r.estimated_returns, r.future_value - r.invested_amount);
        assert!((r.estimated_returns - dec!(422136.32)).abs() < dec!(0.5));
    }

    #[test]
    fn test_compute_aborts_on_first_invalid() {
        let plans = vec![
            plan("ok", dec!(1000), dec!(8), dec!(2)),
            plan("bad", dec!(0), dec!(8), dec!(2)),
            plan("worse", dec!(1000), dec!(8), dec!(0)),
        ];
        let err = compute(&plans).unwrap_err();
        assert!(matches!(err, SipError::InvalidPlanInput { index: 1, .. }));
    }

    #[test]
    fn test_compute_with_policy_skip() {
        let plans = vec![
            plan("ok", dec!(1000), dec!(8), dec!(2)),
            plan("bad", dec!(-1), dec!(8), dec!(2)),
            plan("also ok", dec!(500), dec!(0), dec!(1)),
        ];
        let out = compute_with_policy(&plans, ValidationPolicy::Skip, AllocationBasis::Invested)
            .unwrap();
        let report = out.result;
        assert_eq!(report.skipped, vec![1]);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[1].name, "also ok");
        assert_eq!(report.totals.total_invested, dec!(30000));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("position 1"));
    }

    #[test]
    fn test_compute_with_policy_abort() {
        let plans = vec![plan("bad", dec!(1000), dec!(8), dec!(0))];
        assert!(
            compute_with_policy(&plans, ValidationPolicy::Abort, AllocationBasis::Invested)
                .is_err()
        );
    }

    #[test]
    fn test_compute_with_policy_ratios() {
        let plans = vec![plan("flat", dec!(1000), dec!(0), dec!(2))];
        let out = compute_with_policy(&plans, ValidationPolicy::Abort, AllocationBasis::Invested)
            .unwrap();
        assert_eq!(out.result.return_pct, Some(Decimal::ZERO));
        assert_eq!(out.result.wealth_multiple_pct, Some(dec!(100)));
    }

    #[test]
    fn test_compute_with_policy_empty() {
        let out = compute_with_policy(&[], ValidationPolicy::Abort, AllocationBasis::Invested)
            .unwrap();
        assert!(out.result.results.is_empty());
        assert!(out.result.allocation.is_empty());
        assert_eq!(out.result.return_pct, None);
        assert_eq!(out.result.totals, Totals::default());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_compute_with_policy_partial_month_warning() {
        let plans = vec![plan("short", dec!(1000), dec!(6), dec!(1.3))];
        let out = compute_with_policy(&plans, ValidationPolicy::Abort, AllocationBasis::Invested)
            .unwrap();
        assert_eq!(out.result.results[0].months, 15);
        assert_eq!(out.result.results[0].invested_amount, dec!(15000));
        assert!(out.warnings[0].contains("15 whole months"));
    }

    #[test]
    fn test_assumptions_recorded() {
        let plans = vec![plan("a", dec!(1000), dec!(7), dec!(10))];
        let out = compute_with_policy(&plans, ValidationPolicy::Skip, AllocationBasis::FutureValue)
            .unwrap();
        assert_eq!(out.assumptions["contribution_timing"], "start_of_month");
        assert_eq!(out.assumptions["validation_policy"], "skip");
        assert_eq!(out.assumptions["allocation_basis"], "future_value");
        assert_eq!(out.assumptions["plan_count"], 1);
    }
}
