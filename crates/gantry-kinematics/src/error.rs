//! Error types for the kinematics layer.

use thiserror::Error;

/// Errors that can occur while building or querying kinematic state.
#[derive(Debug, Error)]
pub enum KinematicsError {
    /// A task or barrier referenced a frame the model does not define.
    #[error("unknown frame: {0}")]
    UnknownFrame(String),

    /// Configuration vector length does not match the model's nq.
    #[error("configuration dimension mismatch: expected {expected}, got {got}")]
    ConfigurationDim { expected: usize, got: usize },

    /// Velocity vector length does not match the model's nv.
    #[error("velocity dimension mismatch: expected {expected}, got {got}")]
    VelocityDim { expected: usize, got: usize },

    /// The model contains a joint type the tree cannot represent.
    #[error("joint {joint} has unsupported type {joint_type}")]
    UnsupportedJoint { joint: String, joint_type: String },

    /// Model-level failure while tracing the tree.
    #[error(transparent)]
    Model(#[from] gantry_model::ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = KinematicsError::UnknownFrame("ee_link".into());
        assert_eq!(e.to_string(), "unknown frame: ee_link");

        let e = KinematicsError::ConfigurationDim {
            expected: 7,
            got: 6,
        };
        assert_eq!(
            e.to_string(),
            "configuration dimension mismatch: expected 7, got 6"
        );

        let e = KinematicsError::UnsupportedJoint {
            joint: "wheel".into(),
            joint_type: "planar".into(),
        };
        assert_eq!(e.to_string(), "joint wheel has unsupported type planar");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn error_is_send_sync() {
        assert_send_sync::<KinematicsError>();
    }
}
