//! Shared robot fixtures and helpers for gantry demos.

use nalgebra::DVector;

/// 6-DOF articulated arm (UR5-class dimensions) with an `ee_link` frame.
pub const SIX_DOF_ARM_URDF: &str = include_str!("../urdf/six_dof_arm.urdf");

/// Reference posture for the six-DOF arm demos: elbow up, tool forward.
pub fn arm_reference_posture() -> DVector<f64> {
    DVector::from_column_slice(&[1.2715, -0.8799, 1.8910, 1.7400, -0.2461, -0.7498])
}
