//! Motion objectives for the differential IK quadratic program.
//!
//! A [`Task`] steers the solver toward a target by contributing a
//! Gauss-Newton pair `(H, c)` to the QP objective `½ vᵀHv + cᵀv` over the
//! joint velocity `v`: reaching the task target over one control period
//! means `J v dt ≈ e(q)`, so `H = dt² JᵀWJ` and `c = −dt JᵀW e`.
//!
//! Targets are explicit state: they change only when a caller retargets
//! the task, never as a side effect of solving.

pub mod error;
pub mod frame_task;
pub mod posture_task;

pub use error::TaskError;
pub use frame_task::FrameTask;
pub use posture_task::PostureTask;

use gantry_kinematics::Configuration;
use nalgebra::{DMatrix, DVector};

/// A weighted objective steering the solver toward a target.
pub trait Task: std::fmt::Debug {
    /// Task error `e(q)` at the current configuration.
    fn compute_error(&self, conf: &Configuration) -> Result<DVector<f64>, TaskError>;

    /// Task Jacobian `∂e/∂q` as a map from joint velocities to error rates.
    fn compute_jacobian(&self, conf: &Configuration) -> Result<DMatrix<f64>, TaskError>;

    /// Contribution `(H, c)` to the QP objective `½ vᵀHv + cᵀv`.
    ///
    /// `H` is `nv x nv`, `c` has length `nv`.
    fn compute_qp_objective(
        &self,
        conf: &Configuration,
        dt: f64,
    ) -> Result<(DMatrix<f64>, DVector<f64>), TaskError>;
}
