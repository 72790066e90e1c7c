//! Error types for the puzzle engine.
//!
//! Only failures that stop an operation live here. Validation outcomes such as
//! `CapacityViolation` are data (`trophic_data::ViolationKind`), not errors.

use thiserror::Error;

/// Failure of a generator or search call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrophicError {
    /// The generator could not build a solvable scenario within its retry budget.
    #[error("Scenario generation exhausted after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    /// The supplied scenario already violates a structural invariant.
    #[error("Infeasible scenario: {0}")]
    InfeasibleScenario(String),

    /// A call argument is outside the supported range.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, TrophicError>;

impl TrophicError {
    #[must_use]
    pub fn infeasible<S: Into<String>>(msg: S) -> Self {
        Self::InfeasibleScenario(msg.into())
    }

    #[must_use]
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameters(msg.into())
    }
}
