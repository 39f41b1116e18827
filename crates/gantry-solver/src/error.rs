//! Error types for the IK solve.

use thiserror::Error;

/// Errors that can occur during a velocity solve.
#[derive(Debug, Error)]
pub enum SolveError {
    /// No feasible velocity exists under the given constraints.
    #[error("QP infeasible: solver terminated with status {status}")]
    Infeasible { status: String },

    /// The backend rejected the problem before solving.
    #[error("QP backend setup failed: {0}")]
    Backend(String),

    /// A task failed to evaluate.
    #[error(transparent)]
    Task(#[from] gantry_tasks::TaskError),

    /// A barrier failed to evaluate.
    #[error(transparent)]
    Barrier(#[from] gantry_barriers::BarrierError),

    /// A task or barrier produced a contribution of the wrong shape.
    #[error("{part} contribution has shape {got}, expected {expected}")]
    ContributionShape {
        part: &'static str,
        expected: String,
        got: String,
    },
}
