//! Protocol constants for the intersection priority link.
//!
//! Every frame is exactly [`WIRE_LEN`] bytes and starts with one of the
//! message-type bytes below. Byte positions that carry no field for a given
//! type are stuffed with [`SENTINEL`] on the sending side.

/// Telemetry query for a scanned tag (Reader->Responder)
pub const MSG_QUERY: u8 = 1;

/// Telemetry response carrying speed and direction (Responder->Reader)
pub const MSG_RESPONSE: u8 = 2;

/// Computed priority broadcast for a tag (Reader->Responder)
pub const MSG_PRIORITY_ASSIGNMENT: u8 = 3;

/// Fixed frame length; anything else on the wire is malformed.
pub const WIRE_LEN: usize = 10;

/// Filler written into every byte position a message type does not use.
///
/// Receivers must never read meaning into stuffed positions; which bytes are
/// live is decided by the type byte alone.
pub const SENTINEL: u8 = 0xFF;

/// Offset of the message-type byte.
pub const OFF_KIND: usize = 0;

/// Offset of the 4-byte tag id.
pub const OFF_TAG_ID: usize = 1;

/// Offset of the emergency-slowdown flag (query only).
pub const OFF_EMERGENCY: usize = 5;

/// Offset of the priority level (priority assignment only).
pub const OFF_PRIORITY: usize = 6;

/// Offset of the vehicle speed in cm/s (response and priority assignment).
pub const OFF_SPEED: usize = 7;

/// Offset of the 2-byte direction code (response and priority assignment).
pub const OFF_DIRECTION: usize = 8;
