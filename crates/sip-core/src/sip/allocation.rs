//! Proportional breakdown of a set of valued plans, as used for allocation
//! charts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SipError;
use crate::sip::plan::{display_name, PlanResult};
use crate::types::Money;
use crate::SipResult;

/// Which per-plan amount weights the allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationBasis {
    #[default]
    Invested,
    FutureValue,
}

/// One plan's share of the whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub name: String,
    pub value: Money,
    /// Percent of the basis total, unrounded.
    pub share_pct: Decimal,
}

impl AllocationBasis {
    pub fn value_of(self, result: &PlanResult) -> Money {
        match self {
            AllocationBasis::Invested => result.invested_amount,
            AllocationBasis::FutureValue => result.future_value,
        }
    }
}

/// Allocation over `results`, labelled by their position in the slice.
pub fn allocate(
    results: &[PlanResult],
    basis: AllocationBasis,
) -> SipResult<Vec<AllocationSlice>> {
    allocate_at(results, 0..results.len(), basis)
}

/// Allocation over `results` where `positions` yields each result's position
/// in the originally submitted list, used for blank-name labels.
pub(crate) fn allocate_at(
    results: &[PlanResult],
    positions: impl IntoIterator<Item = usize>,
    basis: AllocationBasis,
) -> SipResult<Vec<AllocationSlice>> {
    let total = results.iter().try_fold(Decimal::ZERO, |acc, r| {
        acc.checked_add(basis.value_of(r))
            .ok_or_else(|| SipError::Overflow {
                context: "allocation total".into(),
            })
    })?;
    let hundred = Decimal::from(100);

    Ok(results
        .iter()
        .zip(positions)
        .map(|(r, pos)| {
            let value = basis.value_of(r);
            let share_pct = if total.is_zero() {
                Decimal::ZERO
            } else {
                value / total * hundred
            };
            AllocationSlice {
                name: display_name(&r.name, pos),
                value,
                share_pct,
            }
        })
        .collect())
}
