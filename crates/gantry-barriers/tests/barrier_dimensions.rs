//! Structural invariants every barrier must satisfy against a fixed robot.
//!
//! Runs a position barrier against a free-flyer biped at the zeroed
//! configuration and checks that all QP contribution shapes line up with
//! the model's velocity dimension and the barrier's output dimension.

use gantry_barriers::{Barrier, PositionBarrier};
use gantry_kinematics::{Configuration, KinematicTree, RootJoint};
use gantry_model::parse_string;
use nalgebra::DVector;

/// Minimal wheeled biped: free-flyer torso, one hip and one wheel per leg.
const BIPED_URDF: &str = r#"
    <robot name="biped">
        <link name="torso"/>
        <link name="left_hip"/>
        <link name="left_wheel"/>
        <link name="right_hip"/>
        <link name="right_wheel"/>
        <joint name="left_hip_pitch" type="revolute">
            <parent link="torso"/><child link="left_hip"/>
            <origin xyz="0 0.17 -0.12"/>
            <axis xyz="0 1 0"/>
            <limit lower="-1.26" upper="1.26" effort="16" velocity="28"/>
        </joint>
        <joint name="left_wheel_roll" type="continuous">
            <parent link="left_hip"/><child link="left_wheel"/>
            <origin xyz="0 0.05 -0.28"/>
            <axis xyz="0 1 0"/>
        </joint>
        <joint name="right_hip_pitch" type="revolute">
            <parent link="torso"/><child link="right_hip"/>
            <origin xyz="0 -0.17 -0.12"/>
            <axis xyz="0 1 0"/>
            <limit lower="-1.26" upper="1.26" effort="16" velocity="28"/>
        </joint>
        <joint name="right_wheel_roll" type="continuous">
            <parent link="right_hip"/><child link="right_wheel"/>
            <origin xyz="0 -0.05 -0.28"/>
            <axis xyz="0 1 0"/>
        </joint>
    </robot>
"#;

const DT: f64 = 1e-3;

/// Zeroed free-flyer configuration of the reference biped.
fn zeroed_biped() -> Configuration {
    let model = parse_string(BIPED_URDF).expect("biped URDF parses");
    let tree = KinematicTree::from_model(&model, RootJoint::FreeFlyer).expect("tree builds");
    let nq = tree.nq();
    Configuration::new(tree, DVector::zeros(nq)).expect("zeroed configuration is accepted")
}

fn left_hip_barrier() -> PositionBarrier {
    PositionBarrier::new("left_hip").with_min(&[0.0, 0.0, 0.0])
}

#[test]
fn qp_contribution_dimensions() {
    let conf = zeroed_biped();
    let nv = conf.nv();

    for barrier in [left_hip_barrier()] {
        let (h, c) = barrier.compute_qp_objective(&conf).unwrap();
        let (g, b) = barrier.compute_qp_inequality(&conf, DT).unwrap();
        assert_eq!(h.nrows(), nv);
        assert_eq!(h.ncols(), nv);
        assert_eq!(c.len(), nv);
        assert_eq!(g.nrows(), barrier.dim());
        assert_eq!(g.ncols(), nv);
        assert_eq!(b.len(), barrier.dim());
    }
}

#[test]
fn barrier_value_dimension() {
    let conf = zeroed_biped();
    for barrier in [left_hip_barrier()] {
        let value = barrier.compute_barrier(&conf).unwrap();
        assert_eq!(value.len(), barrier.dim());
    }
}

#[test]
fn barrier_jacobian_dimensions() {
    let conf = zeroed_biped();
    for barrier in [left_hip_barrier()] {
        let jacobian = barrier.compute_jacobian(&conf).unwrap();
        assert_eq!(jacobian.nrows(), barrier.dim());
        assert_eq!(jacobian.ncols(), conf.nv());
    }
}

#[test]
fn zero_safe_radius_zeroes_objective() {
    let conf = zeroed_biped();
    for barrier in [left_hip_barrier().with_safe_radius(0.0)] {
        let (h, c) = barrier.compute_qp_objective(&conf).unwrap();
        assert!(h.iter().all(|&v| v == 0.0));
        assert!(c.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn positive_safe_radius_activates_objective() {
    let conf = zeroed_biped();
    for barrier in [left_hip_barrier().with_safe_radius(1.0)] {
        let (h, c) = barrier.compute_qp_objective(&conf).unwrap();
        assert!(h.iter().any(|&v| v != 0.0));
        let v_safe = barrier.compute_safe_policy(&conf).unwrap();
        if v_safe.iter().any(|&v| v != 0.0) {
            assert!(c.iter().any(|&v| v != 0.0));
        }
    }
}

#[test]
fn display_lists_gain_policy_and_radius() {
    for barrier in [PositionBarrier::new("universe")
        .with_safe_radius(0.0)
        .with_min(&[0.0, 0.0, 0.0])]
    {
        let repr = barrier.to_string();
        assert!(repr.contains("gain="), "missing gain in {repr}");
        assert!(repr.contains("safety_policy="), "missing policy in {repr}");
        assert!(repr.contains("r="), "missing radius in {repr}");
    }
}
