//! In-process loopback between one host and any number of clients

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use parking_lot::RwLock;

use arena_combat_server::config::CombatConfig;
use arena_combat_server::game::{
    HitTag, LayerMask, Participant, PresentationEvent, RayHit, SpatialQuery,
};
use arena_combat_server::replication::{ActorId, ConnectionId, Outgoing};
use arena_combat_server::ws::protocol::ServerMsg;
use arena_combat_server::util::time::tick_delta;

/// Every ray hits `target` as a player when set, otherwise nothing
#[derive(Default)]
pub struct TargetScene {
    target: RwLock<Option<ActorId>>,
}

impl TargetScene {
    pub fn aim_at(&self, target: Option<ActorId>) {
        *self.target.write() = target;
    }
}

impl SpatialQuery for TargetScene {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, _: LayerMask) -> Option<RayHit> {
        let target = (*self.target.read())?;
        Some(RayHit {
            point: origin + direction * max_distance.min(5.0),
            normal: -direction,
            actor: Some(target),
            tag: HitTag::Player,
        })
    }
}

pub struct Client {
    pub connection: ConnectionId,
    pub participant: Participant,
    pub events: Vec<PresentationEvent>,
    /// Host -> client link delay in ticks
    delay: u64,
    in_flight: VecDeque<(u64, ServerMsg)>,
}

impl Client {
    pub fn actor(&self) -> ActorId {
        self.participant
            .local_actor()
            .expect("client has joined")
    }
}

pub struct Loopback {
    pub config: Arc<CombatConfig>,
    pub scene: Arc<TargetScene>,
    pub host: Participant,
    pub host_events: Vec<PresentationEvent>,
    pub clients: Vec<Client>,
    seed: u64,
    tick: u64,
}

impl Loopback {
    pub fn new(config: CombatConfig) -> Self {
        let config = Arc::new(config);
        let scene = Arc::new(TargetScene::default());
        Self {
            host: Participant::host(config.clone(), scene.clone(), 1),
            config,
            scene,
            host_events: Vec::new(),
            clients: Vec::new(),
            seed: 1,
            tick: 0,
        }
    }

    /// Connect a client and run one tick so it sees its welcome
    pub fn connect(&mut self) -> usize {
        self.connect_with_delay(0)
    }

    /// Connect a client whose host traffic arrives `delay` ticks late.
    /// Ticks until the welcome has arrived.
    pub fn connect_with_delay(&mut self, delay: u64) -> usize {
        self.seed += 1;
        let connection = ConnectionId::new_v4();
        self.host
            .accept_connection(connection)
            .expect("host accepts connection");
        self.clients.push(Client {
            connection,
            participant: Participant::client(self.config.clone(), self.scene.clone(), self.seed),
            events: Vec::new(),
            delay,
            in_flight: VecDeque::new(),
        });
        for _ in 0..=delay {
            self.tick();
        }
        self.clients.len() - 1
    }

    pub fn disconnect(&mut self, index: usize) -> Client {
        let client = self.clients.remove(index);
        self.host.disconnect(client.connection);
        client
    }

    pub fn tick(&mut self) {
        self.tick_by(tick_delta());
    }

    pub fn tick_for(&mut self, duration: Duration) {
        let ticks = (duration.as_micros() / tick_delta().as_micros()).max(1);
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Client requests queued since the last tick reach the host first.
    /// Host traffic reaches each client after that client's link delay.
    pub fn tick_by(&mut self, dt: Duration) {
        self.route_to_host();

        self.host.tick(dt);
        self.host_events.extend(self.host.drain_presentation());
        self.route_to_clients();

        for client in &mut self.clients {
            while client
                .in_flight
                .front()
                .is_some_and(|(due, _)| *due <= self.tick)
            {
                if let Some((_, msg)) = client.in_flight.pop_front() {
                    client.participant.enqueue_from_host(msg);
                }
            }
            client.participant.tick(dt);
            client.events.extend(client.participant.drain_presentation());
        }
        self.route_to_host();
        self.tick += 1;
    }

    fn route_to_host(&mut self) {
        for client in &mut self.clients {
            for outgoing in client.participant.drain_outgoing() {
                if let Outgoing::ToHost(msg) = outgoing {
                    self.host.enqueue_from_client(client.connection, msg);
                }
            }
        }
    }

    fn route_to_clients(&mut self) {
        for outgoing in self.host.drain_outgoing() {
            let Outgoing::ToClients { to, msg } = outgoing else {
                continue;
            };
            for client in &mut self.clients {
                if to.includes(client.connection) {
                    client.in_flight.push_back((self.tick + client.delay, msg.clone()));
                }
            }
        }
    }
}

pub fn count_muzzle_flashes(events: &[PresentationEvent], shooter: ActorId) -> usize {
    use arena_combat_server::ws::protocol::CombatEffect;
    events
        .iter()
        .filter(|e| {
            matches!(e, PresentationEvent::Effect(CombatEffect::MuzzleFlash { shooter: s, .. }) if *s == shooter)
        })
        .count()
}
