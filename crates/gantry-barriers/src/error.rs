//! Error types for barrier evaluation.

use thiserror::Error;

/// Errors that can occur while evaluating a barrier.
#[derive(Debug, Error)]
pub enum BarrierError {
    /// Kinematic query failed (unknown frame, dimension mismatch).
    #[error(transparent)]
    Kinematics(#[from] gantry_kinematics::KinematicsError),
}
