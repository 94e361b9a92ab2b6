//! Batch reactor facility
//!
//! Implements the two-callback step protocol the host invokes once per step,
//! tick then tock.
//!
//! See `facility.rs` for the state machine.

pub mod facility;
pub mod phase;

use crate::config::ConfigError;
use crate::market::MarketError;
use crate::models::buffer::BufferError;
use thiserror::Error;

pub use facility::BatchReactor;
pub use phase::Phase;

/// Errors surfaced by the facility to its host
#[derive(Debug, Error, PartialEq)]
pub enum ReactorError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Order or transfer claim inconsistent with this facility's role
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// A step callback hit a phase it has no behavior for
    #[error("BatchReactors have undefined behavior during {step}s for phase: {phase}")]
    UndefinedPhaseBehavior { step: &'static str, phase: Phase },

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("Facility has been decommissioned")]
    Decommissioned,
}
