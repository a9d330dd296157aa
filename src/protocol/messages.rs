//! Message types exchanged between the reader and responder nodes.

use std::fmt;

/// 4-byte identifier read off a vehicle's RFID tag.
///
/// Opaque to the protocol; equality is byte-exact.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub struct TagId(pub [u8; 4]);

impl TagId {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

/// Travel direction reported for a vehicle.
///
/// On the wire this is a 2-byte big-endian code: `0x0100` left, `0x0001`
/// right, `0x0101` straight. Only those three codes are defined; any other
/// pair is a protocol violation.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Direction {
    Left,
    Right,
    Straight,
}

impl Direction {
    /// All defined directions, in wire-code order.
    pub const ALL: [Direction; 3] = [Direction::Left, Direction::Right, Direction::Straight];

    /// The big-endian code this direction serializes to.
    pub fn wire_code(self) -> u16 {
        match self {
            Direction::Left => 0x0100,
            Direction::Right => 0x0001,
            Direction::Straight => 0x0101,
        }
    }

    /// Decode a wire code, `None` for the undefined combinations.
    pub fn from_wire_code(code: u16) -> Option<Direction> {
        match code {
            0x0100 => Some(Direction::Left),
            0x0001 => Some(Direction::Right),
            0x0101 => Some(Direction::Straight),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Straight => "straight",
        };
        write!(f, "{}", name)
    }
}

/// A decoded protocol frame.
#[derive(PartialEq, Debug, Clone)]
pub enum Message {
    Query(Query),
    Response(Response),
    PriorityAssignment(PriorityAssignment),
}

impl Message {
    /// The tag this message is about, whatever its type.
    pub fn tag_id(&self) -> TagId {
        match self {
            Message::Query(q) => q.tag_id,
            Message::Response(r) => r.tag_id,
            Message::PriorityAssignment(p) => p.tag_id,
        }
    }
}

/// Type 1: the reader asks for a tag's current telemetry.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Query {
    pub tag_id: TagId,
    /// Set when an external trigger requests traffic be slowed for this tag.
    /// The autonomous scan path always sends `false`.
    pub emergency_slowdown: bool,
}

/// Type 2: the responder's answer carrying the vehicle's telemetry.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Response {
    pub tag_id: TagId,
    /// Vehicle speed in cm/s.
    pub speed: u8,
    pub direction: Direction,
}

/// Type 3: the priority the reader computed for a tag, broadcast after a
/// response. Echoes the speed and direction the decision was based on.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct PriorityAssignment {
    pub tag_id: TagId,
    pub priority: u8,
    pub speed: u8,
    pub direction: Direction,
}
