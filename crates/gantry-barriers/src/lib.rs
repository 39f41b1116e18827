//! Control barrier functions for differential inverse kinematics.
//!
//! A [`Barrier`] encodes a safety constraint as a vector function `h(q)`
//! that stays non-negative while the robot is safe. Each barrier shapes the
//! velocity QP twice:
//!
//! - an **inequality** `-J v <= b` keeping the next step inside the safe
//!   set, with `b_i = min(gain * h_i, h_i / dt)`: the exponential CBF bound
//!   clamped so one control period cannot jump the boundary;
//! - an optional **objective** term `½ w ||J (v - v_safe)||²` pulling the
//!   solution toward a backup policy as the boundary approaches, with
//!   `w = r / (||h||² + ε)`. A safe radius `r` of zero disables the term
//!   exactly.
//!
//! The backup policy `v_safe` climbs the barrier gradient:
//! `v_safe = safety_policy * Jᵀ (gain * h)`.

pub mod configuration_barrier;
pub mod error;
pub mod position_barrier;

pub use configuration_barrier::ConfigurationBarrier;
pub use error::BarrierError;
pub use position_barrier::PositionBarrier;

use gantry_kinematics::Configuration;
use nalgebra::{DMatrix, DVector};

/// Division guard in the objective weight `r / (||h||² + EPSILON)`.
const EPSILON: f64 = 1e-2;

/// A safety constraint contributing to the velocity QP.
///
/// Implementors provide the barrier value and its Jacobian; the QP
/// contributions are derived here so every barrier shapes the program the
/// same way.
pub trait Barrier: std::fmt::Debug + std::fmt::Display {
    /// Output dimension of `h(q)`.
    fn dim(&self) -> usize;

    /// Exponential CBF gain (1/s).
    fn gain(&self) -> f64;

    /// Safe radius `r`: weight of the backup-policy objective. Zero
    /// disables the objective contribution entirely.
    fn safe_radius(&self) -> f64;

    /// Gain of the backup safety policy.
    fn safety_policy(&self) -> f64;

    /// Barrier value `h(q)`, length [`dim`](Barrier::dim), non-negative
    /// while safe.
    fn compute_barrier(&self, conf: &Configuration) -> Result<DVector<f64>, BarrierError>;

    /// Barrier Jacobian `∂h/∂q`, shape `dim x nv`.
    fn compute_jacobian(&self, conf: &Configuration) -> Result<DMatrix<f64>, BarrierError>;

    /// Backup joint velocity climbing the barrier gradient, length nv.
    fn compute_safe_policy(&self, conf: &Configuration) -> Result<DVector<f64>, BarrierError> {
        let h = self.compute_barrier(conf)?;
        let jacobian = self.compute_jacobian(conf)?;
        Ok(jacobian.transpose() * h * (self.gain() * self.safety_policy()))
    }

    /// Contribution `(H, c)` to the QP objective `½ vᵀHv + cᵀv`.
    ///
    /// `H = w JᵀJ` and `c = -H v_safe` with `w = r / (||h||² + ε)`; both
    /// are exactly zero when the safe radius is zero.
    fn compute_qp_objective(
        &self,
        conf: &Configuration,
    ) -> Result<(DMatrix<f64>, DVector<f64>), BarrierError> {
        let nv = conf.nv();
        let r = self.safe_radius();
        if r <= 0.0 {
            return Ok((DMatrix::zeros(nv, nv), DVector::zeros(nv)));
        }

        let h = self.compute_barrier(conf)?;
        let jacobian = self.compute_jacobian(conf)?;
        let v_safe = self.compute_safe_policy(conf)?;

        let w = r / (h.norm_squared() + EPSILON);
        let big_h = jacobian.transpose() * &jacobian * w;
        let c = -(&big_h * v_safe);
        Ok((big_h, c))
    }

    /// Inequality contribution `(G, b)` with `G v <= b` over the velocity.
    ///
    /// `G = -J`, shape `dim x nv`; `b_i = min(gain * h_i, h_i / dt)`.
    fn compute_qp_inequality(
        &self,
        conf: &Configuration,
        dt: f64,
    ) -> Result<(DMatrix<f64>, DVector<f64>), BarrierError> {
        let h = self.compute_barrier(conf)?;
        let jacobian = self.compute_jacobian(conf)?;

        let g = -jacobian;
        let b = h.map(|hi| (self.gain() * hi).min(hi / dt));
        Ok((g, b))
    }
}
