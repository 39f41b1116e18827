//! Length-prefixed JSON framing for the visualization wire protocol.
//!
//! Every message on the wire is a 4-byte **little-endian** `u32` length
//! prefix followed by that many bytes of UTF-8 JSON payload.
//!
//! ```text
//! +----------------+------------------+
//! | Length (4B LE) | JSON Payload     |
//! +----------------+------------------+
//! ```

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::VizError;

/// Maximum frame payload size (16 MiB).
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Write a length-prefixed JSON message to a stream.
///
/// Serializes `msg` to JSON, writes the 4-byte little-endian length prefix,
/// then the payload. The stream is flushed after writing.
pub fn write_message<T: Serialize>(writer: &mut impl Write, msg: &T) -> Result<(), VizError> {
    let payload = serde_json::to_vec(msg)?;

    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(VizError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    // Safe: MAX_MESSAGE_SIZE (16 MiB) fits in u32.
    let len = u32::try_from(payload.len())
        .map_err(|_| VizError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        })?
        .to_le_bytes();
    writer.write_all(&len)?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Read a length-prefixed JSON message from a stream.
///
/// Returns `Ok(None)` if the stream reaches EOF before any bytes are read
/// (clean disconnect). Used by viewers and tests; the publishing side never
/// reads.
pub fn read_message<T: DeserializeOwned>(reader: &mut impl Read) -> Result<Option<T>, VizError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(VizError::Io(e)),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(VizError::PayloadTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    let msg: T = serde_json::from_slice(&payload)?;
    Ok(Some(msg))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
