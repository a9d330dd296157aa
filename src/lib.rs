//! Traffic-priority protocol for RFID-equipped intersections.
//!
//! A roadside reader node scans vehicle tags, queries a remote node for
//! telemetry over a lossy radio mesh, and broadcasts a computed priority
//! back. The wire format is a fixed 10-byte frame with sentinel-stuffed
//! unused positions; see [`protocol`] for the layout.

pub mod channel;
pub mod config;
pub mod node;
pub mod policy;
pub mod protocol;
pub mod reader;
pub mod responder;
pub mod scanner;
pub mod telemetry;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use channel::{Channel, NodeAddr};
pub use protocol::{Message, ParseError, decode, encode};
