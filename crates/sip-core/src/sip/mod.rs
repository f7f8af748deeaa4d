pub mod allocation;
pub mod engine;
pub mod plan;

#[cfg(feature = "collector")]
pub mod collector;

pub use allocation::{allocate, AllocationBasis, AllocationSlice};
pub use engine::{
    compute, compute_with_policy, future_value, project_plan, SipOutput, SipReport,
    ValidationPolicy,
};
pub use plan::{display_name, PlanInput, PlanResult, Totals};

#[cfg(feature = "collector")]
pub use collector::PlanBook;
