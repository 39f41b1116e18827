//! Posture task: stay near a reference joint configuration.

use nalgebra::{DMatrix, DVector};

use gantry_kinematics::Configuration;

use crate::error::TaskError;
use crate::Task;

/// Pulls every single-DOF joint toward a reference posture.
///
/// Acts in velocity space over actuated joints only; a free-flyer base is
/// untouched. Typically run with a small cost as a regularizer under a
/// higher-priority frame task.
#[derive(Debug, Clone)]
pub struct PostureTask {
    /// Cost per radian (or meter) of posture error.
    cost: f64,
    target_q: Option<DVector<f64>>,
}

impl PostureTask {
    /// Create a posture task with no target.
    pub const fn new(cost: f64) -> Self {
        Self {
            cost,
            target_q: None,
        }
    }

    /// Current target posture, if one has been set.
    #[must_use]
    pub const fn target(&self) -> Option<&DVector<f64>> {
        self.target_q.as_ref()
    }

    /// Set the target posture (full nq-length position vector).
    pub fn set_target(&mut self, q_ref: DVector<f64>) {
        self.target_q = Some(q_ref);
    }

    /// Target the posture of `conf` as it currently stands.
    pub fn set_target_from_configuration(&mut self, conf: &Configuration) {
        self.target_q = Some(conf.q().clone());
    }
}

impl Task for PostureTask {
    fn compute_error(&self, conf: &Configuration) -> Result<DVector<f64>, TaskError> {
        let target = self
            .target_q
            .as_ref()
            .ok_or_else(|| TaskError::TargetNotSet("posture".into()))?;
        Ok(conf.posture_difference(target)?)
    }

    fn compute_jacobian(&self, conf: &Configuration) -> Result<DMatrix<f64>, TaskError> {
        // Selector over single-DOF velocity coordinates.
        let nv = conf.nv();
        let mut jacobian = DMatrix::zeros(nv, nv);
        for (_, idx_v) in conf.tree().actuated_dofs() {
            jacobian[(idx_v, idx_v)] = 1.0;
        }
        Ok(jacobian)
    }

    fn compute_qp_objective(
        &self,
        conf: &Configuration,
        dt: f64,
    ) -> Result<(DMatrix<f64>, DVector<f64>), TaskError> {
        let error = self.compute_error(conf)?;
        let nv = conf.nv();
        let w = self.cost * self.cost;

        // The Jacobian is a diagonal selector, so H and c are assembled
        // directly instead of through dense products.
        let mut h = DMatrix::zeros(nv, nv);
        let mut c = DVector::zeros(nv);
        for (_, idx_v) in conf.tree().actuated_dofs() {
            h[(idx_v, idx_v)] = w * dt * dt;
            c[idx_v] = -w * dt * error[idx_v];
        }
        Ok((h, c))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
