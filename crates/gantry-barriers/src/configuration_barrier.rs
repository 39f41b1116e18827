//! Joint-limit barrier over every bounded degree of freedom.

use std::fmt;

use nalgebra::{DMatrix, DVector};

use gantry_kinematics::{BoundedDof, Configuration, KinematicTree};

use crate::error::BarrierError;
use crate::Barrier;

/// Keeps every bounded single-DOF joint inside its position limits.
///
/// For each bounded joint the barrier contributes two rows:
/// `q - lower >= 0` and `upper - q >= 0`, ordered lower-side first over all
/// joints, then upper-side. Free-flyer coordinates and continuous joints
/// are unbounded and do not appear.
#[derive(Debug, Clone)]
pub struct ConfigurationBarrier {
    dofs: Vec<BoundedDof>,
    gain: f64,
    safety_policy: f64,
    r: f64,
}

impl ConfigurationBarrier {
    /// Build a barrier over the bounded joints of `tree`.
    pub fn new(tree: &KinematicTree) -> Self {
        Self {
            dofs: tree.bounded_dofs(),
            gain: 1.0,
            safety_policy: 1.0,
            r: 0.0,
        }
    }

    /// Set the exponential CBF gain.
    #[must_use]
    pub const fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Set the backup safety-policy gain.
    #[must_use]
    pub const fn with_safety_policy(mut self, safety_policy: f64) -> Self {
        self.safety_policy = safety_policy;
        self
    }

    /// Set the safe radius `r` weighting the backup-policy objective.
    #[must_use]
    pub const fn with_safe_radius(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    /// Names of the joints under constraint.
    pub fn joint_names(&self) -> Vec<&str> {
        self.dofs.iter().map(|d| d.name.as_str()).collect()
    }
}

impl Barrier for ConfigurationBarrier {
    fn dim(&self) -> usize {
        2 * self.dofs.len()
    }

    fn gain(&self) -> f64 {
        self.gain
    }

    fn safe_radius(&self) -> f64 {
        self.r
    }

    fn safety_policy(&self) -> f64 {
        self.safety_policy
    }

    fn compute_barrier(&self, conf: &Configuration) -> Result<DVector<f64>, BarrierError> {
        let q = conf.q();
        let n = self.dofs.len();
        let mut h = DVector::zeros(2 * n);
        for (k, dof) in self.dofs.iter().enumerate() {
            h[k] = q[dof.idx_q] - dof.lower;
            h[n + k] = dof.upper - q[dof.idx_q];
        }
        Ok(h)
    }

    fn compute_jacobian(&self, conf: &Configuration) -> Result<DMatrix<f64>, BarrierError> {
        let n = self.dofs.len();
        let mut jacobian = DMatrix::zeros(2 * n, conf.nv());
        for (k, dof) in self.dofs.iter().enumerate() {
            jacobian[(k, dof.idx_v)] = 1.0;
            jacobian[(n + k, dof.idx_v)] = -1.0;
        }
        Ok(jacobian)
    }
}

impl fmt::Display for ConfigurationBarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigurationBarrier(joints={}, gain={}, safety_policy={}, r={})",
            self.dofs.len(),
            self.gain,
            self.safety_policy,
            self.r
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
