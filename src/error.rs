//! Error types for the reconstruction pipeline.

use crate::Real;
use thiserror::Error;

/// Result type alias for reconstruction operations.
pub type Result<T> = std::result::Result<T, ReconstructionError>;

/// Errors that can occur while fitting the implicit function.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    /// The dense kernel system is singular or too ill-conditioned to solve.
    ///
    /// This is data-dependent (duplicate or near-duplicate constraint
    /// positions); there is no fallback and no partial solution.
    #[error("singular or ill-conditioned system at elimination step {step} (best pivot {pivot:.3e})")]
    SingularSystem {
        /// Elimination step at which no acceptable pivot was found.
        step: usize,
        /// Magnitude of the best available pivot at that step.
        pivot: Real,
    },
}
