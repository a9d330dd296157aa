//! Reader role: the leaf-side initiator of the exchange.
//!
//! On a tag scan the reader queries the remote node for that vehicle's
//! telemetry, and on the response it computes a priority and broadcasts the
//! assignment. The wait for a response spans scheduler iterations; the state
//! below is an explicit value owned by the loop, not a flag buried in the
//! handler.
//!
//! There is no request id on the wire, so a response is matched to the
//! pending query purely by trusting its own tag id field. A stray or late
//! response is therefore consumed as if it answered the current query.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::policy::PriorityPolicy;
use crate::protocol::{Message, PriorityAssignment, Query, TagId};

/// What the reader is currently doing.
#[derive(Debug, Clone, Copy)]
pub enum ReaderState {
    /// Nothing in flight; the next scan starts an exchange.
    Idle,
    /// A query is outstanding and its response is pending.
    AwaitingResponse {
        query: Query,
        issued_at: Instant,
        retries_used: u8,
    },
}

/// Reader role logic. Produces outbound messages; the scheduling loop owns
/// delivery and timing.
pub struct Reader<P> {
    state: ReaderState,
    policy: P,
    config: ReaderConfig,
}

impl<P: PriorityPolicy> Reader<P> {
    pub fn new(policy: P, config: ReaderConfig) -> Self {
        Self {
            state: ReaderState::Idle,
            policy,
            config,
        }
    }

    pub fn state(&self) -> &ReaderState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ReaderState::Idle)
    }

    /// A tag was scanned. From idle this issues a query; while a response is
    /// pending the scan is dropped. The autonomous loop always passes
    /// `emergency_slowdown = false`; an external trigger may set it.
    pub fn on_tag(
        &mut self,
        tag_id: TagId,
        emergency_slowdown: bool,
        now: Instant,
    ) -> Option<Message> {
        match self.state {
            ReaderState::Idle => {
                let query = Query {
                    tag_id,
                    emergency_slowdown,
                };
                info!(tag = %tag_id, emergency = emergency_slowdown, "tag detected, querying telemetry");
                self.state = ReaderState::AwaitingResponse {
                    query,
                    issued_at: now,
                    retries_used: 0,
                };
                Some(Message::Query(query))
            }
            ReaderState::AwaitingResponse { query, .. } => {
                debug!(tag = %tag_id, pending = %query.tag_id, "scan dropped while awaiting a response");
                None
            }
        }
    }

    /// An inbound message was decoded. A response while one is pending
    /// completes the exchange with a priority assignment; everything else is
    /// ignored without a state change.
    pub fn on_message(&mut self, msg: &Message) -> Option<Message> {
        let pending = match self.state {
            ReaderState::AwaitingResponse { query, .. } => query,
            ReaderState::Idle => {
                debug!("message dropped, no exchange in progress");
                return None;
            }
        };

        match msg {
            Message::Response(response) => {
                if response.tag_id != pending.tag_id {
                    debug!(
                        got = %response.tag_id,
                        pending = %pending.tag_id,
                        "response tag differs from pending query, trusting response"
                    );
                }
                let priority = self.policy.priority(response.speed, response.direction);
                info!(
                    tag = %response.tag_id,
                    speed = response.speed,
                    direction = %response.direction,
                    priority,
                    "telemetry received, broadcasting priority"
                );
                self.state = ReaderState::Idle;
                Some(Message::PriorityAssignment(PriorityAssignment {
                    tag_id: response.tag_id,
                    priority,
                    speed: response.speed,
                    direction: response.direction,
                }))
            }
            other => {
                debug!(tag = %other.tag_id(), "non-response message ignored while awaiting");
                None
            }
        }
    }

    /// Periodic deadline check. A timed-out query is re-issued up to the
    /// configured budget, then abandoned back to idle.
    pub fn on_tick(&mut self, now: Instant) -> Option<Message> {
        let (query, issued_at, retries_used) = match self.state {
            ReaderState::AwaitingResponse {
                query,
                issued_at,
                retries_used,
            } => (query, issued_at, retries_used),
            ReaderState::Idle => return None,
        };

        if now.duration_since(issued_at) < self.config.response_timeout() {
            return None;
        }

        if retries_used < self.config.max_retries {
            warn!(
                tag = %query.tag_id,
                attempt = retries_used + 1,
                "response timed out, re-issuing query"
            );
            self.state = ReaderState::AwaitingResponse {
                query,
                issued_at: now,
                retries_used: retries_used + 1,
            };
            Some(Message::Query(query))
        } else {
            warn!(tag = %query.tag_id, "response timed out, giving up on tag");
            self.state = ReaderState::Idle;
            None
        }
    }
}
