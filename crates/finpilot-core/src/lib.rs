pub mod error;
pub mod sip;
pub mod types;

#[cfg(feature = "market")]
pub mod market;

#[cfg(feature = "profile")]
pub mod profile;

#[cfg(feature = "advisor")]
pub mod advisor;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

pub use error::FinPilotError;
pub use types::*;

/// Standard result type for all finpilot operations
pub type FinPilotResult<T> = Result<T, FinPilotError>;
