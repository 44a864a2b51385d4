//! Error types for spin-dynamics runs.

use ndarray as nd;
use thiserror::Error;

/// Any error produced by the dynamics engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The per-step equilibrium system could not be solved.
    #[error("steady-state generator matrix is singular:\n{matrix}")]
    SingularSystem {
        /// The offending generator matrix.
        matrix: nd::Array2<f64>,
    },

    /// Numerical integration broke down partway through a run.
    #[error("integration diverged at step {step}: \
        non-finite state or substep limit exceeded")]
    Integration {
        /// Index of the first bad step.
        step: usize,
    },

    /// A derived quantity was requested before the run completed.
    #[error("trajectory is incomplete; run the solver to completion first")]
    NotReady,

    /// Input series disagree in length, or a grid parameter is out of range.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
}

pub type Result<T> = std::result::Result<T, Error>;
