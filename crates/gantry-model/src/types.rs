//! Core data types for the in-memory robot model.
//!
//! These types are the crate's canonical representation of a robot,
//! independent of the XML parsing layer. They retain exactly what
//! differential IK needs: the kinematic tree, joint axes, and limits.

use std::collections::HashMap;

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// JointType
// ---------------------------------------------------------------------------

/// URDF joint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointType {
    /// Rotation about a single axis, with position limits.
    Revolute,
    /// Unlimited rotation about a single axis.
    Continuous,
    /// Translation along an axis, with position limits.
    Prismatic,
    /// No relative motion between parent and child.
    Fixed,
    /// Unconstrained 6-DOF joint (used for free-flyer bases).
    Floating,
    /// Planar motion (unsupported by the kinematics layer).
    Planar,
}

impl JointType {
    /// Whether this joint type has a single actuatable degree of freedom.
    pub const fn is_actuated(self) -> bool {
        matches!(self, Self::Revolute | Self::Continuous | Self::Prismatic)
    }

    /// Number of position coordinates this joint occupies.
    ///
    /// A floating joint stores `[x y z | qx qy qz qw]`.
    pub const fn nq(self) -> usize {
        match self {
            Self::Revolute | Self::Continuous | Self::Prismatic => 1,
            Self::Floating => 7,
            Self::Fixed => 0,
            Self::Planar => 3,
        }
    }

    /// Number of velocity coordinates this joint occupies.
    pub const fn nv(self) -> usize {
        match self {
            Self::Revolute | Self::Continuous | Self::Prismatic => 1,
            Self::Floating => 6,
            Self::Fixed => 0,
            Self::Planar => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// JointLimits
// ---------------------------------------------------------------------------

/// Limits on a joint's motion, effort, and velocity.
#[derive(Debug, Clone, Default)]
pub struct JointLimits {
    /// Lower position limit (rad or m). `None` means unbounded.
    pub lower: Option<f64>,
    /// Upper position limit (rad or m). `None` means unbounded.
    pub upper: Option<f64>,
    /// Maximum effort (Nm or N). Zero means unspecified.
    pub effort: f64,
    /// Maximum velocity (rad/s or m/s). Zero means unspecified.
    pub velocity: f64,
}

// ---------------------------------------------------------------------------
// Origin
// ---------------------------------------------------------------------------

/// A 3D pose specified as position + roll-pitch-yaw.
#[derive(Debug, Clone)]
pub struct Origin {
    /// Translation `[x, y, z]` in meters.
    pub xyz: [f64; 3],
    /// Rotation `[roll, pitch, yaw]` in radians.
    pub rpy: [f64; 3],
}

impl Default for Origin {
    fn default() -> Self {
        Self {
            xyz: [0.0; 3],
            rpy: [0.0; 3],
        }
    }
}

// ---------------------------------------------------------------------------
// LinkData
// ---------------------------------------------------------------------------

/// In-memory representation of a URDF link.
///
/// Every link name doubles as a frame name for tasks and barriers, so the
/// model keeps all links, including those attached through fixed joints.
#[derive(Debug, Clone)]
pub struct LinkData {
    /// Link name.
    pub name: String,
}

impl LinkData {
    /// Create a link from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ---------------------------------------------------------------------------
// JointData
// ---------------------------------------------------------------------------

/// In-memory representation of a URDF joint.
#[derive(Debug, Clone)]
pub struct JointData {
    /// Joint name.
    pub name: String,
    /// Joint type.
    pub joint_type: JointType,
    /// Parent link name.
    pub parent: String,
    /// Child link name.
    pub child: String,
    /// Joint origin relative to parent link.
    pub origin: Origin,
    /// Joint axis (unit vector, default `[0, 0, 1]`).
    pub axis: [f64; 3],
    /// Motion limits.
    pub limits: JointLimits,
}

// ---------------------------------------------------------------------------
// RobotModel
// ---------------------------------------------------------------------------

/// Complete in-memory representation of a robot's kinematic tree.
///
/// Constructed by the parser and consumed by the kinematics layer.
#[derive(Debug, Clone)]
pub struct RobotModel {
    /// Robot name.
    pub name: String,
    /// All links, keyed by name.
    pub links: HashMap<String, LinkData>,
    /// All joints, keyed by name.
    pub joints: HashMap<String, JointData>,
    /// Name of the root link (the one never referenced as a child).
    pub root_link: String,
}

impl RobotModel {
    /// Get a link by name.
    pub fn link(&self, name: &str) -> Result<&LinkData, ModelError> {
        self.links
            .get(name)
            .ok_or_else(|| ModelError::MissingLink(name.into()))
    }

    /// Get a joint by name.
    pub fn joint(&self, name: &str) -> Result<&JointData, ModelError> {
        self.joints
            .get(name)
            .ok_or_else(|| ModelError::MissingJoint(name.into()))
    }

    /// Iterate over actuatable joints (revolute, continuous, prismatic).
    pub fn actuated_joints(&self) -> impl Iterator<Item = &JointData> {
        self.joints.values().filter(|j| j.joint_type.is_actuated())
    }

    /// Number of actuatable degrees of freedom, excluding any root mount.
    pub fn dof(&self) -> usize {
        self.actuated_joints().count()
    }

    /// Joints whose parent is `link`, sorted by joint name.
    ///
    /// The sort gives the kinematics layer a deterministic coordinate
    /// layout independent of hash-map iteration order.
    pub fn child_joints(&self, link: &str) -> Vec<&JointData> {
        let mut children: Vec<&JointData> =
            self.joints.values().filter(|j| j.parent == link).collect();
        children.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        children
    }

    /// Names of all joints, sorted alphabetically.
    pub fn joint_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.joints.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of actuated joints, sorted alphabetically.
    pub fn actuated_joint_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actuated_joints().map(|j| j.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
