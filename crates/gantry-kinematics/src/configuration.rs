//! Robot configuration: joint coordinates plus cached forward kinematics.
//!
//! A [`Configuration`] owns a [`KinematicTree`], the position vector `q`,
//! and the world transform of every link frame. The transform cache is
//! recomputed whenever `q` changes, so tasks and barriers always read
//! consistent kinematics.

use nalgebra::{
    DMatrix, DVector, Isometry3, Matrix3, Quaternion, Translation3, UnitQuaternion, Vector3,
};

use crate::error::KinematicsError;
use crate::tree::{JointKind, KinematicTree, joint_transform, WORLD_FRAME};

/// Joint-coordinate state with cached forward-kinematics results.
#[derive(Debug, Clone)]
pub struct Configuration {
    tree: KinematicTree,
    q: DVector<f64>,
    transforms: Vec<Isometry3<f64>>,
}

impl Configuration {
    /// Create a configuration from a tree and a position vector.
    ///
    /// The free-flyer orientation block is normalized; an all-zero
    /// quaternion (e.g. from a zero-filled vector) normalizes to identity.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::ConfigurationDim`] if `q.len() != nq`.
    pub fn new(tree: KinematicTree, q: DVector<f64>) -> Result<Self, KinematicsError> {
        if q.len() != tree.nq() {
            return Err(KinematicsError::ConfigurationDim {
                expected: tree.nq(),
                got: q.len(),
            });
        }
        let mut conf = Self {
            transforms: vec![Isometry3::identity(); tree.nodes().len()],
            tree,
            q,
        };
        conf.normalize();
        conf.run_forward_kinematics();
        Ok(conf)
    }

    /// Create a configuration at the tree's neutral position.
    pub fn neutral(tree: KinematicTree) -> Self {
        let q = tree.neutral();
        // Neutral q always has the right length and a unit quaternion.
        Self::new(tree, q).expect("neutral configuration is well-formed")
    }

    /// The kinematic tree.
    #[must_use]
    pub fn tree(&self) -> &KinematicTree {
        &self.tree
    }

    /// The position vector.
    #[must_use]
    pub fn q(&self) -> &DVector<f64> {
        &self.q
    }

    /// Number of position coordinates.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.tree.nq()
    }

    /// Number of velocity coordinates.
    #[must_use]
    pub fn nv(&self) -> usize {
        self.tree.nv()
    }

    /// Replace the position vector and refresh the transform cache.
    pub fn update(&mut self, q: DVector<f64>) -> Result<(), KinematicsError> {
        if q.len() != self.tree.nq() {
            return Err(KinematicsError::ConfigurationDim {
                expected: self.tree.nq(),
                got: q.len(),
            });
        }
        self.q = q;
        self.normalize();
        self.run_forward_kinematics();
        Ok(())
    }

    // -----------------------------------------------------------------
    // Frame queries
    // -----------------------------------------------------------------

    /// World pose of `frame`. The world frame itself is the identity.
    pub fn transform_frame_to_world(
        &self,
        frame: &str,
    ) -> Result<Isometry3<f64>, KinematicsError> {
        if frame == WORLD_FRAME {
            return Ok(Isometry3::identity());
        }
        let idx = self
            .tree
            .frame_node(frame)
            .ok_or_else(|| KinematicsError::UnknownFrame(frame.into()))?;
        Ok(self.transforms[idx])
    }

    /// Frame Jacobian: rows 0-2 map velocities to the frame origin's linear
    /// velocity, rows 3-5 to its angular velocity, both in the world frame.
    ///
    /// The world frame's Jacobian is identically zero.
    pub fn frame_jacobian(&self, frame: &str) -> Result<DMatrix<f64>, KinematicsError> {
        self.jacobian_rows(frame, true)
    }

    /// Position-only frame Jacobian (3 x nv).
    pub fn frame_position_jacobian(&self, frame: &str) -> Result<DMatrix<f64>, KinematicsError> {
        self.jacobian_rows(frame, false)
    }

    fn jacobian_rows(
        &self,
        frame: &str,
        angular: bool,
    ) -> Result<DMatrix<f64>, KinematicsError> {
        let rows = if angular { 6 } else { 3 };
        if frame == WORLD_FRAME {
            return Ok(DMatrix::zeros(rows, self.tree.nv()));
        }
        let idx = self
            .tree
            .frame_node(frame)
            .ok_or_else(|| KinematicsError::UnknownFrame(frame.into()))?;

        let mut jacobian = DMatrix::zeros(rows, self.tree.nv());
        let p = self.transforms[idx].translation.vector;

        let nodes = self.tree.nodes();
        let mut walk = Some(idx);
        while let Some(i) = walk {
            let node = &nodes[i];
            let parent_pose = node
                .parent
                .map_or_else(Isometry3::identity, |pi| self.transforms[pi]);

            match &node.kind {
                JointKind::Revolute { axis } => {
                    let joint_pose = parent_pose * node.origin;
                    let a = joint_pose.rotation * axis.into_inner();
                    let o = joint_pose.translation.vector;
                    let lin = a.cross(&(p - o));
                    set_column3(&mut jacobian, 0, node.idx_v, &lin);
                    if angular {
                        set_column3(&mut jacobian, 3, node.idx_v, &a);
                    }
                }
                JointKind::Prismatic { axis } => {
                    let joint_pose = parent_pose * node.origin;
                    let a = joint_pose.rotation * axis.into_inner();
                    set_column3(&mut jacobian, 0, node.idx_v, &a);
                }
                JointKind::Floating => {
                    // World-frame twist: v_p = v_base + w x (p - p_base).
                    let r = p - self.transforms[i].translation.vector;
                    for k in 0..3 {
                        jacobian[(k, node.idx_v + k)] = 1.0;
                    }
                    let minus_skew_r = Matrix3::new(
                        0.0, r.z, -r.y, //
                        -r.z, 0.0, r.x, //
                        r.y, -r.x, 0.0,
                    );
                    for col in 0..3 {
                        for row in 0..3 {
                            jacobian[(row, node.idx_v + 3 + col)] = minus_skew_r[(row, col)];
                        }
                    }
                    if angular {
                        for k in 0..3 {
                            jacobian[(3 + k, node.idx_v + 3 + k)] = 1.0;
                        }
                    }
                }
                JointKind::Fixed => {}
            }
            walk = node.parent;
        }

        Ok(jacobian)
    }

    // -----------------------------------------------------------------
    // Integration
    // -----------------------------------------------------------------

    /// Integrate a velocity over `dt`, returning the next position vector.
    ///
    /// Single-DOF coordinates advance linearly; the free-flyer orientation
    /// advances on the quaternion manifold via the exponential map of the
    /// world-frame angular velocity.
    pub fn integrate(&self, v: &DVector<f64>, dt: f64) -> Result<DVector<f64>, KinematicsError> {
        if v.len() != self.tree.nv() {
            return Err(KinematicsError::VelocityDim {
                expected: self.tree.nv(),
                got: v.len(),
            });
        }

        let mut q_next = self.q.clone();
        for node in self.tree.nodes() {
            match &node.kind {
                JointKind::Revolute { .. } | JointKind::Prismatic { .. } => {
                    q_next[node.idx_q] += v[node.idx_v] * dt;
                }
                JointKind::Floating => {
                    for k in 0..3 {
                        q_next[node.idx_q + k] += v[node.idx_v + k] * dt;
                    }
                    let omega =
                        Vector3::new(v[node.idx_v + 3], v[node.idx_v + 4], v[node.idx_v + 5]);
                    let rotation = UnitQuaternion::from_scaled_axis(omega * dt)
                        * read_quaternion(&self.q, node.idx_q + 3);
                    write_quaternion(&mut q_next, node.idx_q + 3, &rotation);
                }
                JointKind::Fixed => {}
            }
        }
        Ok(q_next)
    }

    /// Integrate a velocity over `dt` in place, refreshing the cache.
    pub fn integrate_inplace(
        &mut self,
        v: &DVector<f64>,
        dt: f64,
    ) -> Result<(), KinematicsError> {
        let q_next = self.integrate(v, dt)?;
        self.update(q_next)
    }

    /// Velocity-space difference `q_ref - q` over single-DOF joints.
    ///
    /// Free-flyer coordinates are excluded (zero entries): posture targets
    /// steer the limbs, not the base.
    pub fn posture_difference(
        &self,
        q_ref: &DVector<f64>,
    ) -> Result<DVector<f64>, KinematicsError> {
        if q_ref.len() != self.tree.nq() {
            return Err(KinematicsError::ConfigurationDim {
                expected: self.tree.nq(),
                got: q_ref.len(),
            });
        }
        let mut diff = DVector::zeros(self.tree.nv());
        for node in self.tree.nodes() {
            if matches!(
                node.kind,
                JointKind::Revolute { .. } | JointKind::Prismatic { .. }
            ) {
                diff[node.idx_v] = q_ref[node.idx_q] - self.q[node.idx_q];
            }
        }
        Ok(diff)
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Normalize the free-flyer quaternion block; zero-norm becomes identity.
    fn normalize(&mut self) {
        for node in self.tree.nodes() {
            if matches!(node.kind, JointKind::Floating) {
                let rotation = read_quaternion(&self.q, node.idx_q + 3);
                write_quaternion(&mut self.q, node.idx_q + 3, &rotation);
            }
        }
    }

    fn run_forward_kinematics(&mut self) {
        let nodes = self.tree.nodes();
        for i in 0..nodes.len() {
            let node = &nodes[i];
            let parent_pose = node
                .parent
                .map_or_else(Isometry3::identity, |pi| self.transforms[pi]);

            self.transforms[i] = match &node.kind {
                JointKind::Fixed => parent_pose * node.origin,
                JointKind::Revolute { .. } | JointKind::Prismatic { .. } => {
                    parent_pose * node.origin * joint_transform(&node.kind, self.q[node.idx_q])
                }
                JointKind::Floating => {
                    let translation = Translation3::new(
                        self.q[node.idx_q],
                        self.q[node.idx_q + 1],
                        self.q[node.idx_q + 2],
                    );
                    let rotation = read_quaternion(&self.q, node.idx_q + 3);
                    parent_pose * node.origin * Isometry3::from_parts(translation, rotation)
                }
            };
        }
    }
}

/// Read a `[qx qy qz qw]` block as a unit quaternion; zero-norm reads as
/// identity.
fn read_quaternion(q: &DVector<f64>, offset: usize) -> UnitQuaternion<f64> {
    let raw = Quaternion::new(q[offset + 3], q[offset], q[offset + 1], q[offset + 2]);
    if raw.norm() < 1e-12 {
        UnitQuaternion::identity()
    } else {
        UnitQuaternion::from_quaternion(raw)
    }
}

/// Write a unit quaternion back as a `[qx qy qz qw]` block.
fn write_quaternion(q: &mut DVector<f64>, offset: usize, rotation: &UnitQuaternion<f64>) {
    q[offset] = rotation.i;
    q[offset + 1] = rotation.j;
    q[offset + 2] = rotation.k;
    q[offset + 3] = rotation.w;
}

fn set_column3(jacobian: &mut DMatrix<f64>, row: usize, col: usize, v: &Vector3<f64>) {
    jacobian[(row, col)] = v.x;
    jacobian[(row + 1, col)] = v.y;
    jacobian[(row + 2, col)] = v.z;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::RootJoint;
    use approx::assert_relative_eq;
    use gantry_model::parse_string;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const TWO_LINK_ARM: &str = r#"
        <robot name="two_link_arm">
            <link name="base"/>
            <link name="upper_arm"/>
            <link name="forearm"/>
            <link name="end_effector"/>
            <joint name="shoulder" type="revolute">
                <parent link="base"/><child link="upper_arm"/>
                <origin xyz="0 0 0.05" rpy="0 0 0"/>
                <axis xyz="0 1 0"/>
                <limit lower="-2.617" upper="2.617" effort="50" velocity="3"/>
            </joint>
            <joint name="elbow" type="revolute">
                <parent link="upper_arm"/><child link="forearm"/>
                <origin xyz="0 0 0.3" rpy="0 0 0"/>
                <axis xyz="0 1 0"/>
                <limit lower="-2.094" upper="2.094" effort="30" velocity="5"/>
            </joint>
            <joint name="ee_fixed" type="fixed">
                <parent link="forearm"/><child link="end_effector"/>
                <origin xyz="0 0 0.25"/>
            </joint>
        </robot>
    "#;

    // Mixed axes and a rotated origin to exercise the general Jacobian path.
    const BENT_ARM: &str = r#"
        <robot name="bent_arm">
            <link name="base"/>
            <link name="link1"/>
            <link name="link2"/>
            <link name="tool"/>
            <joint name="yaw" type="revolute">
                <parent link="base"/><child link="link1"/>
                <origin xyz="0 0 0.1" rpy="0 0 0.4"/>
                <axis xyz="0 0 1"/>
                <limit lower="-3.1" upper="3.1" effort="10" velocity="2"/>
            </joint>
            <joint name="pitch" type="revolute">
                <parent link="link1"/><child link="link2"/>
                <origin xyz="0.05 0 0.2" rpy="0.3 0 0"/>
                <axis xyz="0 1 0"/>
                <limit lower="-2.0" upper="2.0" effort="10" velocity="2"/>
            </joint>
            <joint name="slide" type="prismatic">
                <parent link="link2"/><child link="tool"/>
                <origin xyz="0 0 0.15"/>
                <axis xyz="1 0 0"/>
                <limit lower="-0.2" upper="0.2" effort="10" velocity="1"/>
            </joint>
        </robot>
    "#;

    fn fixed_conf(urdf: &str, q: &[f64]) -> Configuration {
        let model = parse_string(urdf).unwrap();
        let tree = KinematicTree::from_model(&model, RootJoint::Fixed).unwrap();
        Configuration::new(tree, DVector::from_column_slice(q)).unwrap()
    }

    fn flyer_conf(urdf: &str) -> Configuration {
        let model = parse_string(urdf).unwrap();
        let tree = KinematicTree::from_model(&model, RootJoint::FreeFlyer).unwrap();
        Configuration::neutral(tree)
    }

    // ---- Forward kinematics ----

    #[test]
    fn fk_zero_position() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.0, 0.0]);
        // Z offsets sum: 0.05 + 0.3 + 0.25 = 0.6
        let ee = conf.transform_frame_to_world("end_effector").unwrap();
        assert_relative_eq!(ee.translation.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.z, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn fk_shoulder_quarter_turn() {
        let conf = fixed_conf(TWO_LINK_ARM, &[std::f64::consts::FRAC_PI_2, 0.0]);
        // Shoulder pitches about +Y: the arm folds from +Z onto +X.
        let ee = conf.transform_frame_to_world("end_effector").unwrap();
        assert_relative_eq!(ee.translation.x, 0.55, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.z, 0.05, epsilon = 1e-12);
    }

    #[test]
    fn fk_elbow_quarter_turn() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.0, std::f64::consts::FRAC_PI_2]);
        // Upper arm stays vertical; forearm folds onto +X at the elbow.
        let ee = conf.transform_frame_to_world("end_effector").unwrap();
        assert_relative_eq!(ee.translation.x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.z, 0.35, epsilon = 1e-12);
    }

    #[test]
    fn fk_universe_is_identity() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.3, -0.2]);
        let world = conf.transform_frame_to_world(WORLD_FRAME).unwrap();
        assert_relative_eq!(world.translation.vector.norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(world.rotation.angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn fk_unknown_frame_errors() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.0, 0.0]);
        let err = conf.transform_frame_to_world("nonexistent").unwrap_err();
        assert!(matches!(err, KinematicsError::UnknownFrame(_)));
    }

    #[test]
    fn fk_free_flyer_base_offset() {
        let model = parse_string(TWO_LINK_ARM).unwrap();
        let tree = KinematicTree::from_model(&model, RootJoint::FreeFlyer).unwrap();
        let mut q = tree.neutral();
        q[0] = 1.0;
        q[1] = -2.0;
        q[2] = 0.5;
        let conf = Configuration::new(tree, q).unwrap();
        let ee = conf.transform_frame_to_world("end_effector").unwrap();
        assert_relative_eq!(ee.translation.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.y, -2.0, epsilon = 1e-12);
        assert_relative_eq!(ee.translation.z, 1.1, epsilon = 1e-12);
    }

    #[test]
    fn zero_quaternion_normalizes_to_identity() {
        let model = parse_string(TWO_LINK_ARM).unwrap();
        let tree = KinematicTree::from_model(&model, RootJoint::FreeFlyer).unwrap();
        let nq = tree.nq();
        let conf = Configuration::new(tree, DVector::zeros(nq)).unwrap();
        assert_relative_eq!(conf.q()[6], 1.0, epsilon = 1e-12);
        let base = conf.transform_frame_to_world("base").unwrap();
        assert_relative_eq!(base.rotation.angle(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let model = parse_string(TWO_LINK_ARM).unwrap();
        let tree = KinematicTree::from_model(&model, RootJoint::Fixed).unwrap();
        let err = Configuration::new(tree, DVector::zeros(5)).unwrap_err();
        assert!(matches!(err, KinematicsError::ConfigurationDim { .. }));
    }

    // ---- Jacobians ----

    /// Central-difference check of the linear Jacobian block.
    fn check_position_jacobian(conf: &Configuration, frame: &str) {
        let jac = conf.frame_position_jacobian(frame).unwrap();
        let eps = 1e-6;
        for j in 0..conf.nv() {
            let mut v = DVector::zeros(conf.nv());
            v[j] = 1.0;

            let mut plus = conf.clone();
            plus.integrate_inplace(&v, eps).unwrap();
            let mut minus = conf.clone();
            minus.integrate_inplace(&v, -eps).unwrap();

            let dp = (plus.transform_frame_to_world(frame).unwrap().translation.vector
                - minus.transform_frame_to_world(frame).unwrap().translation.vector)
                / (2.0 * eps);

            for row in 0..3 {
                assert_relative_eq!(jac[(row, j)], dp[row], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn position_jacobian_matches_finite_differences() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..5 {
            let q: Vec<f64> = (0..3).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let conf = fixed_conf(BENT_ARM, &q);
            check_position_jacobian(&conf, "tool");
            check_position_jacobian(&conf, "link2");
        }
    }

    #[test]
    fn free_flyer_jacobian_matches_finite_differences() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let model = parse_string(BENT_ARM).unwrap();
        let tree = KinematicTree::from_model(&model, RootJoint::FreeFlyer).unwrap();
        let mut conf = Configuration::neutral(tree);

        // Random base twist + joint motion to leave the neutral pose.
        let v: Vec<f64> = (0..conf.nv()).map(|_| rng.gen_range(-0.5..0.5)).collect();
        conf.integrate_inplace(&DVector::from_column_slice(&v), 1.0)
            .unwrap();

        check_position_jacobian(&conf, "tool");
    }

    #[test]
    fn full_jacobian_angular_rows() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.4, -0.3]);
        let jac = conf.frame_jacobian("end_effector").unwrap();
        assert_eq!(jac.nrows(), 6);
        assert_eq!(jac.ncols(), 2);
        // Both joints rotate about +Y (axes unchanged by Y-rotations).
        for j in 0..2 {
            assert_relative_eq!(jac[(3, j)], 0.0, epsilon = 1e-12);
            assert_relative_eq!(jac[(4, j)], 1.0, epsilon = 1e-12);
            assert_relative_eq!(jac[(5, j)], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn universe_jacobian_is_zero() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.4, -0.3]);
        let jac = conf.frame_jacobian(WORLD_FRAME).unwrap();
        assert_relative_eq!(jac.norm(), 0.0, epsilon = 1e-12);
    }

    // ---- Integration ----

    #[test]
    fn integrate_advances_single_dof() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.1, 0.2]);
        let v = DVector::from_column_slice(&[1.0, -2.0]);
        let q_next = conf.integrate(&v, 0.01).unwrap();
        assert_relative_eq!(q_next[0], 0.11, epsilon = 1e-12);
        assert_relative_eq!(q_next[1], 0.18, epsilon = 1e-12);
    }

    #[test]
    fn integrate_preserves_quaternion_norm() {
        let mut conf = flyer_conf(TWO_LINK_ARM);
        let mut v = DVector::zeros(conf.nv());
        v[3] = 2.0; // wx
        v[4] = -1.0; // wy
        v[5] = 0.5; // wz
        for _ in 0..100 {
            conf.integrate_inplace(&v, 0.01).unwrap();
        }
        let quat_norm = (conf.q()[3].powi(2)
            + conf.q()[4].powi(2)
            + conf.q()[5].powi(2)
            + conf.q()[6].powi(2))
        .sqrt();
        assert_relative_eq!(quat_norm, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn integrate_world_angular_velocity_yaws_base() {
        let mut conf = flyer_conf(TWO_LINK_ARM);
        let mut v = DVector::zeros(conf.nv());
        v[5] = std::f64::consts::FRAC_PI_2; // yaw rate, 1 second
        conf.integrate_inplace(&v, 1.0).unwrap();
        let base = conf.transform_frame_to_world("base").unwrap();
        let rotated = base.rotation * Vector3::x();
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn integrate_velocity_dim_mismatch() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.0, 0.0]);
        let err = conf.integrate(&DVector::zeros(5), 0.01).unwrap_err();
        assert!(matches!(err, KinematicsError::VelocityDim { .. }));
    }

    // ---- Posture difference ----

    #[test]
    fn posture_difference_single_dof() {
        let conf = fixed_conf(TWO_LINK_ARM, &[0.1, 0.2]);
        let q_ref = DVector::from_column_slice(&[0.5, -0.2]);
        let diff = conf.posture_difference(&q_ref).unwrap();
        assert_relative_eq!(diff[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(diff[1], -0.4, epsilon = 1e-12);
    }

    #[test]
    fn posture_difference_skips_free_flyer() {
        let conf = flyer_conf(TWO_LINK_ARM);
        let mut q_ref = conf.q().clone();
        q_ref[0] = 5.0; // base x: must not appear in the difference
        q_ref[7] = 0.3; // shoulder
        let diff = conf.posture_difference(&q_ref).unwrap();
        assert_eq!(diff.len(), conf.nv());
        for k in 0..6 {
            assert_relative_eq!(diff[k], 0.0, epsilon = 1e-12);
        }
        assert_relative_eq!(diff[6], 0.3, epsilon = 1e-12);
    }
}
