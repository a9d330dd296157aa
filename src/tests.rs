use std::time::{Duration, Instant};

use crate::channel::{Channel, InProcessChannel, NodeAddr};
use crate::config::ReaderConfig;
use crate::node::{reader_step, responder_step};
use crate::policy::{PRIORITY_MAX, PRIORITY_NORMAL, ThresholdPolicy};
use crate::protocol::{
    Direction, Message, PriorityAssignment, Query, Response, TagId, decode, encode,
};
use crate::reader::Reader;
use crate::responder::Responder;
use crate::scanner::ScriptedScanner;
use crate::telemetry::FixedTelemetry;

fn create_test_tag() -> TagId {
    TagId([0x01, 0x02, 0x03, 0x04])
}

fn create_reader(config: ReaderConfig) -> Reader<ThresholdPolicy> {
    Reader::new(ThresholdPolicy::default(), config)
}

fn create_responder(speed: u8, direction: Direction) -> Responder<FixedTelemetry> {
    Responder::new(FixedTelemetry { speed, direction })
}

fn create_response(tag_id: TagId, speed: u8, direction: Direction) -> Message {
    Message::Response(Response {
        tag_id,
        speed,
        direction,
    })
}

#[test]
fn reader_issues_query_on_tag() {
    let mut reader = create_reader(ReaderConfig::default());
    let out = reader.on_tag(create_test_tag(), false, Instant::now());

    assert_eq!(
        out,
        Some(Message::Query(Query {
            tag_id: create_test_tag(),
            emergency_slowdown: false,
        }))
    );
    assert!(!reader.is_idle());
}

#[test]
fn reader_completes_exchange_with_priority_assignment() {
    let mut reader = create_reader(ReaderConfig::default());
    let now = Instant::now();
    reader.on_tag(create_test_tag(), false, now);

    let out = reader.on_message(&create_response(create_test_tag(), 150, Direction::Left));
    assert_eq!(
        out,
        Some(Message::PriorityAssignment(PriorityAssignment {
            tag_id: create_test_tag(),
            priority: PRIORITY_MAX,
            speed: 150,
            direction: Direction::Left,
        }))
    );
    assert!(reader.is_idle());
}

#[test]
fn reader_assigns_normal_priority_at_threshold() {
    let mut reader = create_reader(ReaderConfig::default());
    reader.on_tag(create_test_tag(), false, Instant::now());

    let out = reader.on_message(&create_response(create_test_tag(), 100, Direction::Straight));
    match out {
        Some(Message::PriorityAssignment(p)) => assert_eq!(p.priority, PRIORITY_NORMAL),
        other => panic!("expected a priority assignment, got {:?}", other),
    }
}

#[test]
fn reader_ignores_non_response_kinds_while_awaiting() {
    let mut reader = create_reader(ReaderConfig::default());
    reader.on_tag(create_test_tag(), false, Instant::now());

    let query = Message::Query(Query {
        tag_id: create_test_tag(),
        emergency_slowdown: false,
    });
    let assignment = Message::PriorityAssignment(PriorityAssignment {
        tag_id: create_test_tag(),
        priority: 1,
        speed: 1,
        direction: Direction::Left,
    });

    assert_eq!(reader.on_message(&query), None);
    assert_eq!(reader.on_message(&assignment), None);
    assert!(!reader.is_idle());
}

#[test]
fn reader_ignores_response_when_idle() {
    let mut reader = create_reader(ReaderConfig::default());
    let out = reader.on_message(&create_response(create_test_tag(), 150, Direction::Left));
    assert_eq!(out, None);
    assert!(reader.is_idle());
}

#[test]
fn reader_trusts_response_tag_over_pending_tag() {
    // There is no request id on the wire: a response for a different tag is
    // consumed as if it answered the pending query, and the assignment
    // carries the response's own tag.
    let mut reader = create_reader(ReaderConfig::default());
    reader.on_tag(create_test_tag(), false, Instant::now());

    let stray = TagId([0xAA, 0xBB, 0xCC, 0xDD]);
    let out = reader.on_message(&create_response(stray, 120, Direction::Right));
    match out {
        Some(Message::PriorityAssignment(p)) => assert_eq!(p.tag_id, stray),
        other => panic!("expected a priority assignment, got {:?}", other),
    }
    assert!(reader.is_idle());
}

#[test]
fn reader_drops_scans_while_awaiting() {
    let mut reader = create_reader(ReaderConfig::default());
    let now = Instant::now();
    reader.on_tag(create_test_tag(), false, now);

    let second = reader.on_tag(TagId([9, 9, 9, 9]), false, now);
    assert_eq!(second, None);
}

#[test]
fn reader_reissues_query_on_timeout_then_gives_up() {
    let config = ReaderConfig {
        response_timeout_ms: 100,
        max_retries: 2,
    };
    let mut reader = create_reader(config);
    let start = Instant::now();

    let query = reader.on_tag(create_test_tag(), false, start);
    assert!(query.is_some());

    // Before the deadline nothing fires.
    assert_eq!(reader.on_tick(start + Duration::from_millis(99)), None);

    // First and second re-issue carry the identical query.
    let t1 = start + Duration::from_millis(101);
    assert_eq!(reader.on_tick(t1), query);
    let t2 = t1 + Duration::from_millis(101);
    assert_eq!(reader.on_tick(t2), query);

    // Budget exhausted: back to idle, nothing sent.
    let t3 = t2 + Duration::from_millis(101);
    assert_eq!(reader.on_tick(t3), None);
    assert!(reader.is_idle());

    // A fresh scan starts a new exchange.
    assert!(reader.on_tag(create_test_tag(), false, t3).is_some());
}

#[test]
fn responder_answers_query_with_telemetry() {
    let mut responder = create_responder(150, Direction::Left);
    let query = Message::Query(Query {
        tag_id: create_test_tag(),
        emergency_slowdown: false,
    });

    let out = responder.on_message(&query);
    assert_eq!(out, Some(create_response(create_test_tag(), 150, Direction::Left)));
}

#[test]
fn responder_answers_each_query_independently() {
    // No deduplication: the same query handled twice yields two responses.
    let mut responder = create_responder(80, Direction::Straight);
    let query = Message::Query(Query {
        tag_id: create_test_tag(),
        emergency_slowdown: false,
    });

    let first = responder.on_message(&query);
    let second = responder.on_message(&query);
    assert!(first.is_some());
    assert_eq!(first, second);
}

#[test]
fn responder_records_priority_assignment_without_reply() {
    let mut responder = create_responder(80, Direction::Straight);
    let assignment = PriorityAssignment {
        tag_id: TagId([0x0A, 0x0B, 0x0C, 0x0D]),
        priority: 128,
        speed: 0x64,
        direction: Direction::Right,
    };

    let out = responder.on_message(&Message::PriorityAssignment(assignment));
    assert_eq!(out, None);
    assert_eq!(responder.last_assignment(), Some(&assignment));
}

#[test]
fn responder_ignores_response_frames() {
    let mut responder = create_responder(80, Direction::Straight);
    let out = responder.on_message(&create_response(create_test_tag(), 10, Direction::Left));
    assert_eq!(out, None);
    assert_eq!(responder.last_assignment(), None);
}

#[test]
fn exchange_produces_expected_wire_bytes() {
    // The full three-message exchange, checked hop by hop at the byte level.
    let mut reader = create_reader(ReaderConfig::default());
    let mut responder = create_responder(150, Direction::Left);

    let query = reader
        .on_tag(create_test_tag(), false, Instant::now())
        .unwrap();
    let query_frame = encode(&query);
    assert_eq!(
        query_frame,
        [0x01, 0x01, 0x02, 0x03, 0x04, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
    );

    let response = responder.on_message(&decode(&query_frame).unwrap()).unwrap();
    let response_frame = encode(&response);
    assert_eq!(
        response_frame,
        [0x02, 0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0x96, 0x01, 0x00]
    );

    let assignment = reader.on_message(&decode(&response_frame).unwrap()).unwrap();
    let assignment_frame = encode(&assignment);
    assert_eq!(
        assignment_frame,
        [0x03, 0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0x96, 0x01, 0x00]
    );

    responder.on_message(&decode(&assignment_frame).unwrap());
    assert_eq!(
        responder.last_assignment(),
        Some(&PriorityAssignment {
            tag_id: create_test_tag(),
            priority: 255,
            speed: 150,
            direction: Direction::Left,
        })
    );
}

#[test]
fn node_steps_drive_a_full_exchange() {
    let (mut reader_end, mut responder_end) = InProcessChannel::pair();
    let mut reader = create_reader(ReaderConfig::default());
    let mut scanner = ScriptedScanner::new([create_test_tag()]);
    let mut responder = create_responder(150, Direction::Left);
    let now = Instant::now();

    // Tick 1: scan fires, query goes out.
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), now);
    // Responder tick: query in, response out.
    responder_step(&mut responder_end, &mut responder, NodeAddr(0));
    // Tick 2: response in, assignment out.
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), now);
    // Responder tick: assignment recorded.
    responder_step(&mut responder_end, &mut responder, NodeAddr(0));

    assert!(reader.is_idle());
    assert_eq!(
        responder.last_assignment(),
        Some(&PriorityAssignment {
            tag_id: create_test_tag(),
            priority: PRIORITY_MAX,
            speed: 150,
            direction: Direction::Left,
        })
    );
}

#[test]
fn lost_response_reissues_then_abandons() {
    let (mut reader_end, mut responder_end) = InProcessChannel::pair();
    let config = ReaderConfig {
        response_timeout_ms: 100,
        max_retries: 1,
    };
    let mut reader = create_reader(config);
    let mut scanner = ScriptedScanner::new([create_test_tag()]);
    let start = Instant::now();

    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), start);
    assert_eq!(responder_end.poll().len(), 1); // first query, never answered

    let t1 = start + Duration::from_millis(101);
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), t1);
    assert_eq!(responder_end.poll().len(), 1); // the one re-issue

    let t2 = t1 + Duration::from_millis(101);
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), t2);
    assert!(responder_end.poll().is_empty());
    assert!(reader.is_idle());
}

#[test]
fn malformed_frames_are_dropped_without_reply() {
    let (mut reader_end, mut responder_end) = InProcessChannel::pair();
    let mut responder = create_responder(80, Direction::Straight);

    // Wrong length, unknown type, undefined direction: none may crash the
    // node or produce a reply.
    reader_end.send(NodeAddr(1), &[0x01, 0x02]);
    reader_end.send(NodeAddr(1), &[0x07; 10]);
    reader_end.send(
        NodeAddr(1),
        &[0x02, 0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0x96, 0x55, 0x55],
    );
    responder_step(&mut responder_end, &mut responder, NodeAddr(0));

    assert!(reader_end.poll().is_empty());
    assert_eq!(responder.last_assignment(), None);
}

#[test]
fn scan_waits_until_pending_exchange_ends() {
    // Two tags queued: the second must not be consumed while the first
    // exchange is in flight.
    let (mut reader_end, mut responder_end) = InProcessChannel::pair();
    let mut reader = create_reader(ReaderConfig::default());
    let second_tag = TagId([0x05, 0x06, 0x07, 0x08]);
    let mut scanner = ScriptedScanner::new([create_test_tag(), second_tag]);
    let mut responder = create_responder(70, Direction::Right);
    let now = Instant::now();

    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), now);
    // Still awaiting: this tick must not scan the second tag.
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), now);
    responder_step(&mut responder_end, &mut responder, NodeAddr(0));
    assert_eq!(responder.last_assignment(), None);

    // Exchange completes, then the second tag gets its own query.
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), now);
    responder_step(&mut responder_end, &mut responder, NodeAddr(0));
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), now);
    responder_step(&mut responder_end, &mut responder, NodeAddr(0));
    reader_step(&mut reader_end, &mut scanner, &mut reader, NodeAddr(1), now);
    responder_step(&mut responder_end, &mut responder, NodeAddr(0));

    assert_eq!(
        responder.last_assignment().map(|a| a.tag_id),
        Some(second_tag)
    );
}

#[test]
fn emergency_flag_reaches_the_wire() {
    let mut reader = create_reader(ReaderConfig::default());
    let query = reader.on_tag(create_test_tag(), true, Instant::now()).unwrap();
    let frame = encode(&query);
    assert_eq!(frame[5], 0x01);
}
