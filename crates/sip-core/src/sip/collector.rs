use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SipError;
use crate::sip::engine::{self, SipOutput};
use crate::sip::plan::PlanInput;
use crate::SipResult;

/// Caller-owned, ordered list of plans being assembled before valuation.
///
/// Rows may be appended, edited in place or removed by position. The engine
/// only ever sees an immutable snapshot via [`PlanBook::plans`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanBook {
    plans: Vec<PlanInput>,
}

impl PlanBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plans(plans: Vec<PlanInput>) -> Self {
        Self { plans }
    }

    pub fn push(&mut self, plan: PlanInput) {
        self.plans.push(plan);
    }

    /// Append a blank-named row pre-filled with 1000/month at 7% for 10 years.
    pub fn add_default(&mut self) -> &mut PlanInput {
        self.plans.push(PlanInput::new("", dec!(1000), dec!(7), dec!(10)));
        let last = self.plans.len() - 1;
        &mut self.plans[last]
    }

    /// Remove the plan at `position` (0-based), shifting later plans down.
    pub fn remove(&mut self, position: usize) -> SipResult<PlanInput> {
        if position >= self.plans.len() {
            return Err(SipError::PositionOutOfRange {
                position,
                len: self.plans.len(),
            });
        }
        Ok(self.plans.remove(position))
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut PlanInput> {
        self.plans.get_mut(position)
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn plans(&self) -> &[PlanInput] {
        &self.plans
    }

    /// First invalid plan, if any.
    pub fn validate(&self) -> SipResult<()> {
        self.plans
            .iter()
            .enumerate()
            .try_for_each(|(i, p)| p.validate(i))
    }

    pub fn compute(&self) -> SipResult<SipOutput> {
        engine::compute(&self.plans)
    }
}

impl From<Vec<PlanInput>> for PlanBook {
    fn from(plans: Vec<PlanInput>) -> Self {
        Self::from_plans(plans)
    }
}
