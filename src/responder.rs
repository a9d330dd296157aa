//! Responder role: the remote telemetry end of the exchange.
//!
//! Stateless between messages. Every query gets an independent response
//! sampled from the telemetry source (no deduplication), and every priority
//! assignment is recorded. A response frame arriving here is outside the
//! protocol for this role and is dropped.

use tracing::{debug, info};

use crate::protocol::{Message, PriorityAssignment, Response};
use crate::telemetry::TelemetrySource;

pub struct Responder<T> {
    telemetry: T,
    last_assignment: Option<PriorityAssignment>,
}

impl<T: TelemetrySource> Responder<T> {
    pub fn new(telemetry: T) -> Self {
        Self {
            telemetry,
            last_assignment: None,
        }
    }

    /// The most recently recorded priority assignment, if any.
    pub fn last_assignment(&self) -> Option<&PriorityAssignment> {
        self.last_assignment.as_ref()
    }

    /// Handle one inbound message, possibly producing a reply.
    pub fn on_message(&mut self, msg: &Message) -> Option<Message> {
        match msg {
            Message::Query(query) => {
                let (speed, direction) = self.telemetry.sample();
                info!(
                    tag = %query.tag_id,
                    emergency = query.emergency_slowdown,
                    speed,
                    direction = %direction,
                    "query received, responding with telemetry"
                );
                Some(Message::Response(Response {
                    tag_id: query.tag_id,
                    speed,
                    direction,
                }))
            }
            Message::PriorityAssignment(assignment) => {
                // The report covers tag, priority and direction; speed rides
                // along on the wire but is not part of the record's summary.
                info!(
                    tag = %assignment.tag_id,
                    priority = assignment.priority,
                    direction = %assignment.direction,
                    "priority assignment recorded"
                );
                self.last_assignment = Some(*assignment);
                None
            }
            Message::Response(_) => {
                debug!("response frame ignored, responders do not consume responses");
                None
            }
        }
    }
}
