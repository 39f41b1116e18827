//! Visualization commands sent over the wire.

use serde::{Deserialize, Serialize};

/// One visualization command.
///
/// Poses are split into translation and a unit quaternion
/// (`[qx, qy, qz, qw]`) so viewers do not need a matrix library to
/// reassemble them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VizCommand {
    /// Declare a named frame marker in the scene graph.
    Frame { path: String },

    /// Pose a scene-graph node in world coordinates.
    SetTransform {
        path: String,
        translation: [f64; 3],
        rotation: [f64; 4],
    },

    /// Redraw the robot at a full configuration vector.
    Display { q: Vec<f64> },
}
