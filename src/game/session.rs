//! Host session: the authoritative tick loop behind the WebSocket server

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info, trace, warn};

use crate::config::CombatConfig;
use crate::replication::{ActorId, ConnectionId, Outgoing, Recipient};
use crate::util::time::tick_delta;
use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::participant::Participant;
use super::spatial::SpatialQuery;

/// Event fed into the session from connection tasks
#[derive(Debug, Clone)]
pub enum SessionInput {
    Connected {
        connection: ConnectionId,
    },
    Message {
        connection: ConnectionId,
        msg: ClientMsg,
        received_at: u64,
    },
    Disconnected {
        connection: ConnectionId,
    },
}

/// A host message and who should receive it
#[derive(Debug, Clone)]
pub struct Outbound {
    pub to: Recipient,
    pub msg: ServerMsg,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub tick: u64,
    pub connections: usize,
    pub actors: usize,
}

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub input_tx: mpsc::Sender<SessionInput>,
    pub outbound_tx: broadcast::Sender<Outbound>,
    stats: Arc<RwLock<SessionStats>>,
    connections: Arc<DashMap<ConnectionId, ActorId>>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.outbound_tx.subscribe()
    }

    pub fn stats(&self) -> SessionStats {
        *self.stats.read()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Actor spawned for `connection`, once the session has accepted it
    pub fn actor_of(&self, connection: ConnectionId) -> Option<ActorId> {
        self.connections.get(&connection).map(|entry| *entry.value())
    }
}

/// The authoritative session
pub struct HostSession {
    participant: Participant,
    input_rx: mpsc::Receiver<SessionInput>,
    outbound_tx: broadcast::Sender<Outbound>,
    stats: Arc<RwLock<SessionStats>>,
    connections: Arc<DashMap<ConnectionId, ActorId>>,
    tick: u64,
}

impl HostSession {
    pub fn new(
        config: Arc<CombatConfig>,
        spatial: Arc<dyn SpatialQuery>,
        seed: u64,
    ) -> (Self, SessionHandle) {
        let (input_tx, input_rx) = mpsc::channel(1024);
        let (outbound_tx, _) = broadcast::channel(1024);
        let stats = Arc::new(RwLock::new(SessionStats::default()));
        let connections = Arc::new(DashMap::new());

        let handle = SessionHandle {
            input_tx,
            outbound_tx: outbound_tx.clone(),
            stats: stats.clone(),
            connections: connections.clone(),
        };

        let session = Self {
            participant: Participant::host(config, spatial, seed),
            input_rx,
            outbound_tx,
            stats,
            connections,
            tick: 0,
        };

        (session, handle)
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    /// Run the tick loop until every handle is dropped
    pub async fn run(mut self) {
        info!(tps = crate::util::time::SIMULATION_TPS, "Session started");

        let mut tick_interval = interval(tick_delta());
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;
            if !self.step(tick_delta()) {
                break;
            }
        }

        info!(ticks = self.tick, "Session stopped");
    }

    /// One tick: inputs, simulation, then fan-out. Returns false once the
    /// input channel has closed.
    pub fn step(&mut self, dt: Duration) -> bool {
        let open = self.process_inputs();
        self.participant.tick(dt);
        self.tick += 1;
        self.flush();

        *self.stats.write() = SessionStats {
            tick: self.tick,
            connections: self.connections.len(),
            actors: self.participant.actor_count(),
        };
        open
    }

    fn process_inputs(&mut self) -> bool {
        loop {
            match self.input_rx.try_recv() {
                Ok(input) => self.handle_input(input),
                Err(mpsc::error::TryRecvError::Empty) => return true,
                Err(mpsc::error::TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_input(&mut self, input: SessionInput) {
        match input {
            SessionInput::Connected { connection } => {
                match self.participant.accept_connection(connection) {
                    Ok(actor) => {
                        self.connections.insert(connection, actor);
                    }
                    Err(err) => warn!(connection = %connection, error = %err, "Connection rejected"),
                }
            }
            SessionInput::Message {
                connection,
                msg,
                received_at,
            } => {
                trace!(connection = %connection, received_at, "Client message");
                self.participant.enqueue_from_client(connection, msg);
            }
            SessionInput::Disconnected { connection } => {
                self.connections.remove(&connection);
                if self.participant.disconnect(connection).is_none() {
                    debug!(connection = %connection, "Disconnect for unknown connection");
                }
            }
        }
    }

    fn flush(&mut self) {
        for outgoing in self.participant.drain_outgoing() {
            match outgoing {
                Outgoing::ToClients { to, msg } => {
                    // No receivers just means nobody is connected
                    let _ = self.outbound_tx.send(Outbound { to, msg });
                }
                Outgoing::ToHost(msg) => warn!(?msg, "Host produced a host-bound message"),
            }
        }

        for event in self.participant.drain_presentation() {
            trace!(?event, "Presentation");
        }
    }
}
