//! Cooperative scheduling loops for the two node roles.
//!
//! Each iteration drains the channel completely (every buffered frame is
//! decoded and handled to the end, including the reply it triggers) before
//! the deadline check or the tag scan run. Handling never blocks on another
//! message; the reader's response wait spans iterations.
//!
//! The per-iteration work is factored into synchronous `*_step` functions so
//! tests can drive a node tick by tick with a controlled clock; the `run_*`
//! loops just call them on a timer.

use std::time::Instant;

use tracing::warn;

use crate::channel::{Channel, NodeAddr};
use crate::config::NodeConfig;
use crate::policy::PriorityPolicy;
use crate::protocol::{Message, decode, encode};
use crate::reader::Reader;
use crate::responder::Responder;
use crate::scanner::TagScanner;
use crate::telemetry::TelemetrySource;

/// Encode and send, logging (not failing) when the channel refuses the
/// frame. Best-effort is the baseline contract; the reader's deadline path
/// covers the loss.
fn send_message<C: Channel>(channel: &mut C, dest: NodeAddr, msg: &Message) {
    let frame = encode(msg);
    if !channel.send(dest, &frame) {
        warn!(dest = %dest, tag = %msg.tag_id(), "channel refused frame, dropping");
    }
}

/// Drain the channel, handing each decoded message to `handle` and sending
/// its reply before the next buffered frame is touched. Malformed frames
/// are dropped with a log line and no reply.
fn drain_inbound<C: Channel>(
    channel: &mut C,
    dest: NodeAddr,
    mut handle: impl FnMut(Message) -> Option<Message>,
) {
    for frame in channel.poll() {
        match decode(&frame) {
            Ok(msg) => {
                if let Some(reply) = handle(msg) {
                    send_message(channel, dest, &reply);
                }
            }
            Err(e) => warn!(error = %e, len = frame.len(), "malformed frame dropped"),
        }
    }
}

/// One reader iteration: inbound frames, then the response deadline, then
/// at most one tag scan (only from idle, so a pending exchange is never
/// preempted).
pub fn reader_step<C, S, P>(
    channel: &mut C,
    scanner: &mut S,
    reader: &mut Reader<P>,
    dest: NodeAddr,
    now: Instant,
) where
    C: Channel,
    S: TagScanner,
    P: PriorityPolicy,
{
    drain_inbound(channel, dest, |msg| reader.on_message(&msg));

    if let Some(retry) = reader.on_tick(now) {
        send_message(channel, dest, &retry);
    }

    if reader.is_idle() {
        if let Some(tag) = scanner.try_read() {
            if let Some(query) = reader.on_tag(tag, false, now) {
                send_message(channel, dest, &query);
            }
        }
    }
}

/// One responder iteration: just the inbound frames.
pub fn responder_step<C, T>(channel: &mut C, responder: &mut Responder<T>, dest: NodeAddr)
where
    C: Channel,
    T: TelemetrySource,
{
    drain_inbound(channel, dest, |msg| responder.on_message(&msg));
}

/// Drive a reader node forever.
pub async fn run_reader<C, S, P>(
    mut channel: C,
    mut scanner: S,
    mut reader: Reader<P>,
    config: &NodeConfig,
) -> anyhow::Result<()>
where
    C: Channel,
    S: TagScanner,
    P: PriorityPolicy,
{
    let dest = NodeAddr(config.peer_addr);
    let mut ticker = tokio::time::interval(config.tick_interval());

    loop {
        ticker.tick().await;
        reader_step(&mut channel, &mut scanner, &mut reader, dest, Instant::now());
    }
}

/// Drive a responder node forever.
pub async fn run_responder<C, T>(
    mut channel: C,
    mut responder: Responder<T>,
    config: &NodeConfig,
) -> anyhow::Result<()>
where
    C: Channel,
    T: TelemetrySource,
{
    let dest = NodeAddr(config.peer_addr);
    let mut ticker = tokio::time::interval(config.tick_interval());

    loop {
        ticker.tick().await;
        responder_step(&mut channel, &mut responder, dest);
    }
}
