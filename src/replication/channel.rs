//! Remote invocation channel shapes
//!
//! Requests go client -> host, broadcasts go host -> every connected participant.
//! Neither carries a reply path.

use crate::ws::protocol::{BroadcastEvent, ClientMsg, RequestCall, ServerMsg};

use super::{ActorId, ConnectionId};

/// Addressing for host -> client traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every currently connected client
    All,
    /// A single connection (welcome, late-join snapshots, pong)
    Only(ConnectionId),
}

impl Recipient {
    pub fn includes(&self, connection: ConnectionId) -> bool {
        match self {
            Recipient::All => true,
            Recipient::Only(c) => *c == connection,
        }
    }
}

/// Message leaving a participant
#[derive(Debug, Clone)]
pub enum Outgoing {
    ToHost(ClientMsg),
    ToClients { to: Recipient, msg: ServerMsg },
}

/// Message waiting in a participant's inbox for the next tick
#[derive(Debug, Clone)]
pub enum Inbound {
    FromHost(ServerMsg),
    FromClient {
        connection: ConnectionId,
        msg: ClientMsg,
    },
}

/// Buffer of outgoing traffic, flushed by the transport after each tick
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Outgoing>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client -> host call on `actor`
    pub fn request(&mut self, actor: ActorId, call: RequestCall) {
        self.pending
            .push(Outgoing::ToHost(ClientMsg::Request { actor, call }));
    }

    /// Host -> all clients. The host's own delivery is done by the caller.
    pub fn broadcast(&mut self, event: BroadcastEvent) {
        self.send(Recipient::All, ServerMsg::Broadcast { event });
    }

    pub fn send(&mut self, to: Recipient, msg: ServerMsg) {
        self.pending.push(Outgoing::ToClients { to, msg });
    }

    pub fn send_to_host(&mut self, msg: ClientMsg) {
        self.pending.push(Outgoing::ToHost(msg));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.pending)
    }
}
