//! Binary frame encoding for the intersection priority link.
//!
//! The inverse of [`decode`](super::parsing::decode): every message type
//! produces exactly one 10-byte frame, and every position the type does not
//! use carries the sentinel. Starting from an all-sentinel frame and writing
//! only the live fields keeps that invariant in one place.

use byteorder::{BigEndian, ByteOrder};

use super::constants::*;
use super::messages::*;

/// Encode a message into its canonical wire frame.
pub fn encode(msg: &Message) -> [u8; WIRE_LEN] {
    let mut frame = [SENTINEL; WIRE_LEN];

    match msg {
        Message::Query(q) => {
            frame[OFF_KIND] = MSG_QUERY;
            frame[OFF_TAG_ID..OFF_TAG_ID + 4].copy_from_slice(q.tag_id.as_bytes());
            frame[OFF_EMERGENCY] = if q.emergency_slowdown { 1 } else { 0 };
        }
        Message::Response(r) => {
            frame[OFF_KIND] = MSG_RESPONSE;
            frame[OFF_TAG_ID..OFF_TAG_ID + 4].copy_from_slice(r.tag_id.as_bytes());
            frame[OFF_SPEED] = r.speed;
            BigEndian::write_u16(&mut frame[OFF_DIRECTION..], r.direction.wire_code());
        }
        Message::PriorityAssignment(p) => {
            frame[OFF_KIND] = MSG_PRIORITY_ASSIGNMENT;
            frame[OFF_TAG_ID..OFF_TAG_ID + 4].copy_from_slice(p.tag_id.as_bytes());
            frame[OFF_PRIORITY] = p.priority;
            frame[OFF_SPEED] = p.speed;
            BigEndian::write_u16(&mut frame[OFF_DIRECTION..], p.direction.wire_code());
        }
    }

    frame
}
