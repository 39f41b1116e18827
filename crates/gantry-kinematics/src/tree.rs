//! Kinematic tree extracted from a [`RobotModel`].
//!
//! A [`KinematicTree`] is a topologically ordered list of nodes, one per
//! link, each carrying the static transform and joint data connecting it to
//! its parent. Actuated joints are assigned contiguous slots in the
//! position vector (`idx_q`) and velocity vector (`idx_v`); a free-flyer
//! root occupies the leading `[x y z | qx qy qz qw]` / 6-velocity block.

use std::collections::HashMap;

use nalgebra::{Isometry3, Matrix3, Translation3, UnitQuaternion, UnitVector3, Vector3};

use gantry_model::{JointType, Origin, RobotModel};

use crate::error::KinematicsError;

/// Name of the implicit world frame.
pub const WORLD_FRAME: &str = "universe";

// ---------------------------------------------------------------------------
// RootJoint
// ---------------------------------------------------------------------------

/// How the robot's root link is mounted on the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootJoint {
    /// Root link welded to the world frame (fixed-base manipulators).
    #[default]
    Fixed,
    /// Free-flyer mount: 7 position coordinates (`[x y z | qx qy qz qw]`)
    /// and a 6-dimensional world-frame twist (mobile and legged robots).
    FreeFlyer,
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Motion type of the joint connecting a node to its parent.
#[derive(Debug, Clone)]
pub(crate) enum JointKind {
    /// Static attachment, no degrees of freedom.
    Fixed,
    /// Rotation about `axis` in the joint frame.
    Revolute { axis: UnitVector3<f64> },
    /// Translation along `axis` in the joint frame.
    Prismatic { axis: UnitVector3<f64> },
    /// Free-flyer root mount.
    Floating,
}

/// One link frame and the joint connecting it to its parent.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Link (frame) name.
    pub link: String,
    /// Joint name; empty for the root mount.
    pub joint: String,
    /// Index of the parent node; `None` for the root link.
    pub parent: Option<usize>,
    /// Static transform from the parent link frame to this joint frame.
    pub origin: Isometry3<f64>,
    /// Joint motion type.
    pub kind: JointKind,
    /// First position coordinate (valid when the joint has DOFs).
    pub idx_q: usize,
    /// First velocity coordinate (valid when the joint has DOFs).
    pub idx_v: usize,
    /// Position limits for single-DOF joints (`±INFINITY` if unbounded).
    pub lower: f64,
    pub upper: f64,
    /// Velocity limit for single-DOF joints (`INFINITY` if unspecified).
    pub v_max: f64,
}

/// A single-DOF joint with finite position limits.
#[derive(Debug, Clone)]
pub struct BoundedDof {
    /// Joint name.
    pub name: String,
    /// Position coordinate index.
    pub idx_q: usize,
    /// Velocity coordinate index.
    pub idx_v: usize,
    /// Lower position limit.
    pub lower: f64,
    /// Upper position limit.
    pub upper: f64,
}

// ---------------------------------------------------------------------------
// KinematicTree
// ---------------------------------------------------------------------------

/// Topologically ordered kinematic tree with a flat coordinate layout.
#[derive(Debug, Clone)]
pub struct KinematicTree {
    nodes: Vec<Node>,
    frame_index: HashMap<String, usize>,
    nq: usize,
    nv: usize,
    root: RootJoint,
}

impl KinematicTree {
    /// Build a kinematic tree from a [`RobotModel`] and a root mount.
    ///
    /// Links are visited depth-first from the model's root link; the
    /// children of each link are ordered by joint name so the coordinate
    /// layout is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`KinematicsError::UnsupportedJoint`] if the model contains
    /// a floating or planar joint anywhere but the root mount.
    pub fn from_model(model: &RobotModel, root: RootJoint) -> Result<Self, KinematicsError> {
        let mut nodes = Vec::with_capacity(model.links.len());
        let mut frame_index = HashMap::with_capacity(model.links.len());

        let (root_kind, mut nq, mut nv) = match root {
            RootJoint::Fixed => (JointKind::Fixed, 0, 0),
            RootJoint::FreeFlyer => (JointKind::Floating, 7, 6),
        };

        nodes.push(Node {
            link: model.root_link.clone(),
            joint: String::new(),
            parent: None,
            origin: Isometry3::identity(),
            kind: root_kind,
            idx_q: 0,
            idx_v: 0,
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
            v_max: f64::INFINITY,
        });
        frame_index.insert(model.root_link.clone(), 0);

        // Depth-first walk; a stack entry is (parent node index, link name).
        let mut stack: Vec<(usize, String)> = vec![(0, model.root_link.clone())];
        while let Some((parent_idx, link)) = stack.pop() {
            for joint in model.child_joints(&link) {
                let kind = match joint.joint_type {
                    JointType::Revolute | JointType::Continuous => JointKind::Revolute {
                        axis: unit_axis(&joint.axis),
                    },
                    JointType::Prismatic => JointKind::Prismatic {
                        axis: unit_axis(&joint.axis),
                    },
                    JointType::Fixed => JointKind::Fixed,
                    JointType::Floating | JointType::Planar => {
                        return Err(KinematicsError::UnsupportedJoint {
                            joint: joint.name.clone(),
                            joint_type: format!("{:?}", joint.joint_type).to_lowercase(),
                        });
                    }
                };

                let (idx_q, idx_v) = (nq, nv);
                nq += joint.joint_type.nq();
                nv += joint.joint_type.nv();

                let (lower, upper) = match joint.joint_type {
                    JointType::Continuous => (f64::NEG_INFINITY, f64::INFINITY),
                    _ => (
                        joint.limits.lower.unwrap_or(f64::NEG_INFINITY),
                        joint.limits.upper.unwrap_or(f64::INFINITY),
                    ),
                };
                let v_max = if joint.limits.velocity > 0.0 {
                    joint.limits.velocity
                } else {
                    f64::INFINITY
                };

                let node_idx = nodes.len();
                nodes.push(Node {
                    link: joint.child.clone(),
                    joint: joint.name.clone(),
                    parent: Some(parent_idx),
                    origin: origin_to_isometry(&joint.origin),
                    kind,
                    idx_q,
                    idx_v,
                    lower,
                    upper,
                    v_max,
                });
                frame_index.insert(joint.child.clone(), node_idx);
                stack.push((node_idx, joint.child.clone()));
            }
        }

        Ok(Self {
            nodes,
            frame_index,
            nq,
            nv,
            root,
        })
    }

    /// Number of position coordinates.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Number of velocity coordinates.
    #[must_use]
    pub fn nv(&self) -> usize {
        self.nv
    }

    /// How the tree is mounted on the world.
    #[must_use]
    pub fn root_joint(&self) -> RootJoint {
        self.root
    }

    /// Names of actuated joints, in coordinate order.
    pub fn joint_names(&self) -> Vec<&str> {
        let mut named: Vec<(usize, &str)> = self
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, JointKind::Revolute { .. } | JointKind::Prismatic { .. }))
            .map(|n| (n.idx_v, n.joint.as_str()))
            .collect();
        named.sort_unstable_by_key(|(idx, _)| *idx);
        named.into_iter().map(|(_, name)| name).collect()
    }

    /// Whether `frame` resolves to a link or the world frame.
    #[must_use]
    pub fn has_frame(&self, frame: &str) -> bool {
        frame == WORLD_FRAME || self.frame_index.contains_key(frame)
    }

    /// All frame names (link names; the world frame is implicit).
    pub fn frame_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.link.as_str()).collect()
    }

    /// Single-DOF joints with finite position limits, in coordinate order.
    pub fn bounded_dofs(&self) -> Vec<BoundedDof> {
        let mut dofs: Vec<BoundedDof> = self
            .nodes
            .iter()
            .filter(|n| {
                matches!(n.kind, JointKind::Revolute { .. } | JointKind::Prismatic { .. })
                    && n.lower.is_finite()
                    && n.upper.is_finite()
            })
            .map(|n| BoundedDof {
                name: n.joint.clone(),
                idx_q: n.idx_q,
                idx_v: n.idx_v,
                lower: n.lower,
                upper: n.upper,
            })
            .collect();
        dofs.sort_unstable_by_key(|d| d.idx_v);
        dofs
    }

    /// Single-DOF joints as `(idx_q, idx_v)` pairs, in coordinate order.
    pub fn actuated_dofs(&self) -> Vec<(usize, usize)> {
        let mut dofs: Vec<(usize, usize)> = self
            .nodes
            .iter()
            .filter(|n| {
                matches!(n.kind, JointKind::Revolute { .. } | JointKind::Prismatic { .. })
            })
            .map(|n| (n.idx_q, n.idx_v))
            .collect();
        dofs.sort_unstable_by_key(|&(_, idx_v)| idx_v);
        dofs
    }

    /// Velocity limits as `(idx_v, v_max)` pairs, finite entries only.
    pub fn velocity_limits(&self) -> Vec<(usize, f64)> {
        let mut limits: Vec<(usize, f64)> = self
            .nodes
            .iter()
            .filter(|n| {
                matches!(n.kind, JointKind::Revolute { .. } | JointKind::Prismatic { .. })
                    && n.v_max.is_finite()
            })
            .map(|n| (n.idx_v, n.v_max))
            .collect();
        limits.sort_unstable_by_key(|(idx, _)| *idx);
        limits
    }

    /// The neutral configuration: zeros, with an identity quaternion in the
    /// free-flyer block.
    pub fn neutral(&self) -> nalgebra::DVector<f64> {
        let mut q = nalgebra::DVector::zeros(self.nq);
        if self.root == RootJoint::FreeFlyer {
            q[6] = 1.0; // qw
        }
        q
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn frame_node(&self, frame: &str) -> Option<usize> {
        self.frame_index.get(frame).copied()
    }
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

fn unit_axis(axis: &[f64; 3]) -> UnitVector3<f64> {
    UnitVector3::new_normalize(Vector3::new(axis[0], axis[1], axis[2]))
}

/// Convert a URDF [`Origin`] (xyz + rpy) to an [`Isometry3`].
pub(crate) fn origin_to_isometry(origin: &Origin) -> Isometry3<f64> {
    let translation = Translation3::new(origin.xyz[0], origin.xyz[1], origin.xyz[2]);
    let rotation = UnitQuaternion::from_matrix(&rotation_matrix_from_rpy(
        origin.rpy[0],
        origin.rpy[1],
        origin.rpy[2],
    ));
    Isometry3::from_parts(translation, rotation)
}

/// Build a rotation matrix from roll-pitch-yaw (extrinsic XYZ, i.e. R_z R_y R_x).
fn rotation_matrix_from_rpy(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
    let (sr, cr) = roll.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sy, cy) = yaw.sin_cos();

    Matrix3::new(
        cy * cp,
        cy * sp * sr - sy * cr,
        cy * sp * cr + sy * sr,
        sy * cp,
        sy * sp * sr + cy * cr,
        sy * sp * cr - cy * sr,
        -sp,
        cp * sr,
        cp * cr,
    )
}

/// Compute the transform for a single-DOF joint at a given position.
pub(crate) fn joint_transform(kind: &JointKind, position: f64) -> Isometry3<f64> {
    match kind {
        JointKind::Revolute { axis } => Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(axis, position),
        ),
        JointKind::Prismatic { axis } => Isometry3::from_parts(
            Translation3::from(axis.into_inner() * position),
            UnitQuaternion::identity(),
        ),
        JointKind::Fixed | JointKind::Floating => Isometry3::identity(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
