use thiserror::Error;

#[derive(Debug, Error)]
pub enum SipError {
    #[error("Invalid plan input at position {index}: {field} — {reason}")]
    InvalidPlanInput {
        index: usize,
        field: String,
        reason: String,
    },

    #[error("Plan position {position} out of range (list has {len} plans)")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },
}
