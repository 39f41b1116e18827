//! Error types for task evaluation.

use thiserror::Error;

/// Errors that can occur while evaluating a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The task has no target; call `set_target` first.
    #[error("task target not set for {0}")]
    TargetNotSet(String),

    /// Kinematic query failed (unknown frame, dimension mismatch).
    #[error(transparent)]
    Kinematics(#[from] gantry_kinematics::KinematicsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_not_set_message() {
        let e = TaskError::TargetNotSet("ee_link".into());
        assert_eq!(e.to_string(), "task target not set for ee_link");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn error_is_send_sync() {
        assert_send_sync::<TaskError>();
    }
}
