use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SipError;
use crate::types::{round_money, Money, Rate, Years};
use crate::SipResult;

/// Monthly growth factor `1 + r` must stay positive, so the annual rate
/// has to be above -1200%.
const MIN_ANNUAL_RATE_PERCENT: Decimal = dec!(-1200);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One systematic investment plan as entered by the user.
///
/// Field aliases accept the column names used by exported fund sheets
/// (`fund_name`, `monthly_investment`, `rate_of_return`, `years`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInput {
    #[serde(default, alias = "fund_name")]
    pub name: String,
    #[serde(alias = "monthly_investment")]
    pub monthly_amount: Money,
    #[serde(alias = "rate_of_return")]
    pub annual_rate_percent: Rate,
    #[serde(alias = "years")]
    pub duration_years: Years,
}

/// Valuation of a single plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    pub name: String,
    pub months: u32,
    pub invested_amount: Money,
    pub future_value: Money,
    pub estimated_returns: Money,
}

/// Aggregate over every valued plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_invested: Money,
    pub total_returns: Money,
    pub total_future_value: Money,
}

// ---------------------------------------------------------------------------
// PlanInput
// ---------------------------------------------------------------------------

impl PlanInput {
    pub fn new(
        name: impl Into<String>,
        monthly_amount: Money,
        annual_rate_percent: Rate,
        duration_years: Years,
    ) -> Self {
        Self {
            name: name.into(),
            monthly_amount,
            annual_rate_percent,
            duration_years,
        }
    }

    /// Number of whole monthly contributions, `trunc(duration_years * 12)`.
    /// `None` when the duration does not fit in a `u32` month count.
    pub fn months(&self) -> Option<u32> {
        self.duration_years
            .checked_mul(dec!(12))
            .and_then(|m| m.trunc().to_u32())
    }

    /// True when `duration_years * 12` is not a whole number of months.
    pub fn has_partial_month(&self) -> bool {
        self.duration_years
            .checked_mul(dec!(12))
            .is_some_and(|m| !m.fract().is_zero())
    }

    /// Monthly rate as a fraction: `annual_rate_percent / 12 / 100`.
    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / dec!(12) / dec!(100)
    }

    /// Check the plan can be valued. `index` is the plan's position in the
    /// submitted list and is carried into the error.
    pub fn validate(&self, index: usize) -> SipResult<()> {
        if self.monthly_amount <= Decimal::ZERO {
            return Err(invalid(index, "monthly_amount", "monthly_amount must be > 0"));
        }
        if self.duration_years <= Decimal::ZERO {
            return Err(invalid(index, "duration_years", "duration_years must be > 0"));
        }
        match self.months() {
            Some(0) => {
                return Err(invalid(
                    index,
                    "duration_years",
                    "duration must cover at least one whole month",
                ))
            }
            None => {
                return Err(invalid(
                    index,
                    "duration_years",
                    "duration exceeds the supported number of months",
                ))
            }
            Some(_) => {}
        }
        if self.annual_rate_percent <= MIN_ANNUAL_RATE_PERCENT {
            return Err(invalid(
                index,
                "annual_rate_percent",
                "annual_rate_percent must be greater than -1200",
            ));
        }
        Ok(())
    }
}

fn invalid(index: usize, field: &str, reason: &str) -> SipError {
    SipError::InvalidPlanInput {
        index,
        field: field.into(),
        reason: reason.into(),
    }
}

fn checked_sum(a: Money, b: Money, context: &str) -> SipResult<Money> {
    a.checked_add(b).ok_or_else(|| SipError::Overflow {
        context: context.into(),
    })
}

/// Label shown for a plan: its name, or `Fund {position + 1}` when blank.
pub fn display_name(name: &str, position: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Fund {}", position + 1)
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Presentation helpers
// ---------------------------------------------------------------------------

impl PlanResult {
    /// Copy with every amount rounded to display precision.
    pub fn rounded(&self) -> PlanResult {
        PlanResult {
            name: self.name.clone(),
            months: self.months,
            invested_amount: round_money(self.invested_amount),
            future_value: round_money(self.future_value),
            estimated_returns: round_money(self.estimated_returns),
        }
    }
}

impl Totals {
    /// Element-wise sum of the per-plan fields.
    pub fn from_results(results: &[PlanResult]) -> SipResult<Totals> {
        results.iter().try_fold(Totals::default(), |acc, r| {
            Ok(Totals {
                total_invested: checked_sum(
                    acc.total_invested,
                    r.invested_amount,
                    "total invested",
                )?,
                total_returns: checked_sum(
                    acc.total_returns,
                    r.estimated_returns,
                    "total returns",
                )?,
                total_future_value: checked_sum(
                    acc.total_future_value,
                    r.future_value,
                    "total future value",
                )?,
            })
        })
    }

    pub fn rounded(&self) -> Totals {
        Totals {
            total_invested: round_money(self.total_invested),
            total_returns: round_money(self.total_returns),
            total_future_value: round_money(self.total_future_value),
        }
    }
}
