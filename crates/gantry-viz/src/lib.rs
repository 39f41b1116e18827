//! Fire-and-forget visualization client.
//!
//! A control loop publishes pose transforms (keyed by scene-graph path) and
//! full configuration vectors to a listening viewer over TCP. The wire
//! format is a 4-byte little-endian length prefix followed by a JSON
//! payload; nothing is ever read back, and a broken connection silently
//! turns the client into a no-op so the loop keeps running.

pub mod client;
pub mod error;
pub mod framing;
pub mod protocol;

pub use client::VizClient;
pub use error::VizError;
pub use protocol::VizCommand;
