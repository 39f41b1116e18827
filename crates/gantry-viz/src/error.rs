//! Error types for the visualization wire protocol.

use thiserror::Error;

/// Errors on the visualization channel.
#[derive(Debug, Error)]
pub enum VizError {
    /// Socket-level failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A frame exceeded the wire-format size cap.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}
