//! URDF parsing and robot model representation for gantry.
//!
//! Provides types for representing a robot's kinematic tree (links and
//! joints) and parsing URDF XML into the crate-canonical [`RobotModel`].
//! The model is purely structural: geometry, inertia, and dynamics are out
//! of scope for differential IK and are not retained.

pub mod error;
pub mod parser;
pub mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::ModelError;
pub use parser::{parse_file, parse_string};
pub use types::{JointData, JointLimits, JointType, LinkData, Origin, RobotModel};
