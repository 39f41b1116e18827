//! Best-effort TCP publisher for visualization commands.

use std::net::{TcpStream, ToSocketAddrs};

use log::warn;
use nalgebra::{DVector, Isometry3};

use crate::error::VizError;
use crate::framing::write_message;
use crate::protocol::VizCommand;

/// Publishes [`VizCommand`]s to a listening viewer, fire-and-forget.
///
/// Sends are best-effort: the first I/O failure logs a warning, drops the
/// connection, and turns every later send into a no-op. A control loop
/// never blocks on (or crashes from) a lost viewer.
#[derive(Debug)]
pub struct VizClient {
    stream: Option<TcpStream>,
}

impl VizClient {
    /// Connect to a viewer at `addr`.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, VizError> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: Some(stream),
        })
    }

    /// A client with no connection; every send is a no-op.
    ///
    /// Lets callers keep one code path whether or not a viewer is attached.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { stream: None }
    }

    /// Whether the client still holds a live connection.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Declare a named frame marker in the viewer's scene graph.
    pub fn frame(&mut self, path: &str) {
        self.send(&VizCommand::Frame { path: path.into() });
    }

    /// Pose a scene-graph node in world coordinates.
    pub fn set_transform(&mut self, path: &str, pose: &Isometry3<f64>) {
        let t = pose.translation.vector;
        let r = pose.rotation;
        self.send(&VizCommand::SetTransform {
            path: path.into(),
            translation: [t.x, t.y, t.z],
            rotation: [r.i, r.j, r.k, r.w],
        });
    }

    /// Redraw the robot at configuration `q`.
    pub fn display(&mut self, q: &DVector<f64>) {
        self.send(&VizCommand::Display {
            q: q.iter().copied().collect(),
        });
    }

    fn send(&mut self, cmd: &VizCommand) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if let Err(e) = write_message(stream, cmd) {
            warn!("viz connection lost, disabling further sends: {e}");
            self.stream = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
