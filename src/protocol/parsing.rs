//! Binary frame decoding for the intersection priority link.
//!
//! Frames are fixed-size with no framing beyond the length itself; every
//! field lives at a hard offset and the type byte decides which offsets are
//! live. Stuffed positions are never inspected, so a frame with garbage in
//! its unused bytes still decodes; "absent" is a property of the type, not
//! of the byte value.
//!
//! # Frame layout
//!
//! ```text
//! +------+---------+-----------+----------+-------+-----------+
//! | kind | tag id  | emergency | priority | speed | direction |
//! | (1)  | (4)     | (1)       | (1)      | (1)   | (2)       |
//! +------+---------+-----------+----------+-------+-----------+
//! ```
//!
//! # Error Handling
//!
//! [`ParseError`] covers malformed frames only: wrong length, unknown type
//! byte, or an undefined direction pair where the type makes direction
//! meaningful. Callers drop such frames; no error crosses the wire.

use byteorder::{BigEndian, ByteOrder};

use super::constants::*;
use super::messages::*;

/// Errors that can occur when decoding a received frame.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseError {
    /// Frame length is not exactly [`WIRE_LEN`] bytes
    InvalidLength(usize),
    /// Unknown or invalid message type byte
    InvalidMessageType(u8),
    /// Direction pair is none of the defined codes
    UnknownDirection(u16),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidLength(n) => write!(f, "Invalid frame length: {} bytes", n),
            ParseError::InvalidMessageType(t) => write!(f, "Invalid message type: 0x{:02x}", t),
            ParseError::UnknownDirection(code) => {
                write!(f, "Unknown direction code: 0x{:04x}", code)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Decode a complete frame.
///
/// # Arguments
///
/// * `data` - Raw frame bytes including the message type byte
///
/// # Returns
///
/// * `Ok(Message)` - Successfully decoded message
/// * `Err(ParseError)` - Malformed frame or unsupported message type
pub fn decode(data: &[u8]) -> Result<Message, ParseError> {
    if data.len() != WIRE_LEN {
        return Err(ParseError::InvalidLength(data.len()));
    }

    match data[OFF_KIND] {
        MSG_QUERY => Ok(Message::Query(decode_query(data))),
        MSG_RESPONSE => Ok(Message::Response(decode_response(data)?)),
        MSG_PRIORITY_ASSIGNMENT => Ok(Message::PriorityAssignment(decode_assignment(data)?)),
        unknown => Err(ParseError::InvalidMessageType(unknown)),
    }
}

/// Read the 4-byte tag id at its fixed offset.
fn read_tag_id(data: &[u8]) -> TagId {
    TagId(data[OFF_TAG_ID..OFF_TAG_ID + 4].try_into().unwrap())
}

/// Read and validate the direction pair at its fixed offset.
fn read_direction(data: &[u8]) -> Result<Direction, ParseError> {
    let code = BigEndian::read_u16(&data[OFF_DIRECTION..]);
    Direction::from_wire_code(code).ok_or(ParseError::UnknownDirection(code))
}

/// Decode a Query (type 1). Bytes 6-9 are stuffed and ignored.
fn decode_query(data: &[u8]) -> Query {
    Query {
        tag_id: read_tag_id(data),
        // Any non-zero flag byte counts as set.
        emergency_slowdown: data[OFF_EMERGENCY] != 0,
    }
}

/// Decode a Response (type 2). Bytes 5-6 are stuffed and ignored.
fn decode_response(data: &[u8]) -> Result<Response, ParseError> {
    Ok(Response {
        tag_id: read_tag_id(data),
        speed: data[OFF_SPEED],
        direction: read_direction(data)?,
    })
}

/// Decode a PriorityAssignment (type 3). Byte 5 is stuffed and ignored.
fn decode_assignment(data: &[u8]) -> Result<PriorityAssignment, ParseError> {
    Ok(PriorityAssignment {
        tag_id: read_tag_id(data),
        priority: data[OFF_PRIORITY],
        speed: data[OFF_SPEED],
        direction: read_direction(data)?,
    })
}
