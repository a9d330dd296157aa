//! Delivery channels standing in for the radio mesh.
//!
//! The protocol owns none of this: transport is an external collaborator
//! with best-effort semantics. Frames may be lost, reordered or duplicated;
//! nothing here promises otherwise.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::UdpSocket;
use tracing::debug;

/// Logical address of a node on the mesh. The radio network uses small
/// octal addresses; 00 and 01 by convention for the two roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeAddr(pub u16);

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02o}", self.0)
    }
}

/// Best-effort, unordered, message-oriented transport between nodes.
///
/// `send` may fail silently or return `false`; there is no delivery
/// guarantee and no duplicate suppression. `poll` drains whatever arrived
/// since the last call, without blocking.
pub trait Channel {
    fn send(&mut self, dest: NodeAddr, frame: &[u8]) -> bool;
    fn poll(&mut self) -> Vec<Vec<u8>>;
}

/// One end of an in-process loopback pair. Used by tests and the demo mode;
/// delivery is reliable and ordered, which the protocol must not rely on
/// but tests are allowed to.
#[derive(Clone)]
pub struct InProcessChannel {
    inbox: Arc<Mutex<VecDeque<Vec<u8>>>>,
    peer_inbox: Arc<Mutex<VecDeque<Vec<u8>>>>,
}

impl InProcessChannel {
    /// Two connected ends: whatever one sends, the other polls.
    pub fn pair() -> (InProcessChannel, InProcessChannel) {
        let a = Arc::new(Mutex::new(VecDeque::new()));
        let b = Arc::new(Mutex::new(VecDeque::new()));
        (
            InProcessChannel {
                inbox: a.clone(),
                peer_inbox: b.clone(),
            },
            InProcessChannel {
                inbox: b,
                peer_inbox: a,
            },
        )
    }
}

impl Channel for InProcessChannel {
    fn send(&mut self, _dest: NodeAddr, frame: &[u8]) -> bool {
        let mut guard = self.peer_inbox.lock().expect("inbox poisoned");
        guard.push_back(frame.to_vec());
        true
    }

    fn poll(&mut self) -> Vec<Vec<u8>> {
        let mut guard = self.inbox.lock().expect("inbox poisoned");
        guard.drain(..).collect()
    }
}

/// Datagram channel over UDP, the closest stdlib-reachable model of the
/// radio link: unreliable, unordered, one frame per datagram.
pub struct UdpChannel {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpChannel {
    pub async fn bind(bind: SocketAddr, peer: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind).await?;
        Ok(Self { socket, peer })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn set_peer(&mut self, peer: SocketAddr) {
        self.peer = peer;
    }
}

impl Channel for UdpChannel {
    // The mesh address rides along for parity with the radio interface; a
    // UDP channel has a single configured peer.
    fn send(&mut self, _dest: NodeAddr, frame: &[u8]) -> bool {
        match self.socket.try_send_to(frame, self.peer) {
            Ok(sent) => sent == frame.len(),
            Err(e) => {
                debug!(error = %e, "datagram send failed");
                false
            }
        }
    }

    fn poll(&mut self) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        let mut buf = [0u8; 1024];

        loop {
            match self.socket.try_recv_from(&mut buf) {
                Ok((len, _src)) => frames.push(buf[..len].to_vec()),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    debug!(error = %e, "datagram receive failed");
                    break;
                }
            }
        }

        frames
    }
}
