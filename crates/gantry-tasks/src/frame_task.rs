//! Frame task: reach a target pose with a named frame.

use nalgebra::{DMatrix, DVector, Isometry3, UnitQuaternion, Vector3};

use gantry_kinematics::Configuration;

use crate::error::TaskError;
use crate::Task;

/// Drives a frame toward a target pose in the world.
///
/// The error is a 6-vector: position residual on top, orientation residual
/// (axis-angle of `R_target · R⁻¹`) below, both in the world frame. Position
/// and orientation rows carry independent costs so a caller can trade
/// translation accuracy against rotation accuracy.
#[derive(Debug, Clone)]
pub struct FrameTask {
    frame: String,
    /// Cost per meter of position error.
    position_cost: f64,
    /// Cost per radian of orientation error.
    orientation_cost: f64,
    /// Levenberg-Marquardt damping, scaled by the squared weighted error.
    lm_damping: f64,
    target: Option<Isometry3<f64>>,
}

impl FrameTask {
    /// Create a frame task with no target.
    pub fn new(frame: impl Into<String>, position_cost: f64, orientation_cost: f64) -> Self {
        Self {
            frame: frame.into(),
            position_cost,
            orientation_cost,
            lm_damping: 0.0,
            target: None,
        }
    }

    /// Set the Levenberg-Marquardt damping factor.
    #[must_use]
    pub const fn with_lm_damping(mut self, lm_damping: f64) -> Self {
        self.lm_damping = lm_damping;
        self
    }

    /// The frame this task drives.
    #[must_use]
    pub fn frame(&self) -> &str {
        &self.frame
    }

    /// Current target pose, if one has been set.
    #[must_use]
    pub const fn target(&self) -> Option<Isometry3<f64>> {
        self.target
    }

    /// Set the target pose in the world frame.
    pub fn set_target(&mut self, target: Isometry3<f64>) {
        self.target = Some(target);
    }

    /// Target the frame's current pose in `conf`.
    pub fn set_target_from_configuration(
        &mut self,
        conf: &Configuration,
    ) -> Result<(), TaskError> {
        self.target = Some(conf.transform_frame_to_world(&self.frame)?);
        Ok(())
    }
}

impl Task for FrameTask {
    fn compute_error(&self, conf: &Configuration) -> Result<DVector<f64>, TaskError> {
        let target = self
            .target
            .ok_or_else(|| TaskError::TargetNotSet(self.frame.clone()))?;
        let pose = conf.transform_frame_to_world(&self.frame)?;

        let pos_err = target.translation.vector - pose.translation.vector;
        let ori_err = orientation_error(&(target.rotation * pose.rotation.inverse()));

        let mut error = DVector::zeros(6);
        error.fixed_rows_mut::<3>(0).copy_from(&pos_err);
        error.fixed_rows_mut::<3>(3).copy_from(&ori_err);
        Ok(error)
    }

    fn compute_jacobian(&self, conf: &Configuration) -> Result<DMatrix<f64>, TaskError> {
        Ok(conf.frame_jacobian(&self.frame)?)
    }

    fn compute_qp_objective(
        &self,
        conf: &Configuration,
        dt: f64,
    ) -> Result<(DMatrix<f64>, DVector<f64>), TaskError> {
        let error = self.compute_error(conf)?;
        let jacobian = self.compute_jacobian(conf)?;

        // W^(1/2) rows: position rows weighted per meter, orientation rows
        // per radian.
        let mut weighted_jac = jacobian;
        let mut weighted_err = error;
        for row in 0..6 {
            let cost = if row < 3 {
                self.position_cost
            } else {
                self.orientation_cost
            };
            for col in 0..weighted_jac.ncols() {
                weighted_jac[(row, col)] *= cost;
            }
            weighted_err[row] *= cost;
        }

        let mut h = weighted_jac.transpose() * &weighted_jac * (dt * dt);
        let c = weighted_jac.transpose() * &weighted_err * (-dt);

        let mu = self.lm_damping * weighted_err.norm_squared();
        for i in 0..h.nrows() {
            h[(i, i)] += mu;
        }

        Ok((h, c))
    }
}

/// Orientation residual as an axis-angle 3-vector.
fn orientation_error(rotation: &UnitQuaternion<f64>) -> Vector3<f64> {
    rotation
        .axis()
        .map_or_else(Vector3::zeros, |axis| axis.into_inner() * rotation.angle())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
