pub mod error;
pub mod sip;
pub mod types;

pub use error::SipError;
pub use types::*;

/// Standard result type for all SIP operations
pub type SipResult<T> = Result<T, SipError>;
