//! One process's instance of the combat core
//!
//! The host and every client each run a [`Participant`]. They only talk through
//! requests, broadcasts and replicated-variable updates; the transport moves
//! [`Outgoing`] messages out and feeds received messages back in through the
//! inbox, which is drained once per tick after due timers have run.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, trace, warn};

use crate::config::CombatConfig;
use crate::error::CombatError;
use crate::replication::{
    ActorId, ActorRegistry, Change, ConnectionId, Inbound, Outbox, Outgoing, Recipient,
    Replicated, Role,
};
use crate::util::time::unix_millis;
use crate::ws::protocol::{
    ActorSnapshot, BroadcastEvent, ClientMsg, CombatEffect, FieldUpdate, ReplicatedField,
    RequestCall, ServerMsg, WeaponSlot,
};

use super::combat::CombatSystem;
use super::lifecycle::{LifecycleChanges, PlayerLifecycle};
use super::presentation::PresentationEvent;
use super::recoil::{Aim, Recoil};
use super::spatial::{LayerMask, SpatialQuery};
use super::timers::{Expired, TimerArena, TimerKey, TimerPurpose};
use super::weapon::{Loadout, TriggerOutcome, WeaponPhase};

/// Camera height above the actor origin
const EYE_HEIGHT: f32 = 1.6;

/// Replicated and local state of one actor
#[derive(Debug)]
pub struct ActorState {
    pub id: ActorId,
    pub owner: ConnectionId,
    pub position: Vec3,
    pub lifecycle: PlayerLifecycle,
    pub active_weapon: Replicated<WeaponSlot>,
    pub loadout: Loadout,
}

impl ActorState {
    fn authoritative(
        id: ActorId,
        owner: ConnectionId,
        position: Vec3,
        config: Arc<CombatConfig>,
    ) -> Self {
        Self {
            id,
            owner,
            position,
            lifecycle: PlayerLifecycle::authoritative(config.player.max_health),
            active_weapon: Replicated::authoritative(WeaponSlot::Primary),
            loadout: Loadout::new(id, config),
        }
        .observe()
    }

    fn from_snapshot(snapshot: &ActorSnapshot, config: Arc<CombatConfig>) -> Self {
        let mut health = (0, config.player.max_health);
        let mut is_dead = (0, false);
        let mut weapon = (0, WeaponSlot::Primary);
        for field in &snapshot.fields {
            match field.value {
                ReplicatedField::Health(v) => health = (field.seq, v),
                ReplicatedField::IsDead(v) => is_dead = (field.seq, v),
                ReplicatedField::ActiveWeapon(v) => weapon = (field.seq, v),
            }
        }

        Self {
            id: snapshot.id,
            owner: snapshot.owner,
            position: snapshot.position,
            lifecycle: PlayerLifecycle::mirror(config.player.max_health, health, is_dead),
            active_weapon: Replicated::mirror(weapon.1, weapon.0),
            loadout: Loadout::new(snapshot.id, config),
        }
        .observe()
    }

    /// Trace every replicated transition this participant observes
    fn observe(mut self) -> Self {
        let id = self.id;
        self.lifecycle
            .health
            .subscribe(move |old, new| trace!(actor = %id, old, new, "Health changed"));
        self.lifecycle
            .is_dead
            .subscribe(move |old, new| trace!(actor = %id, old, new, "Death state changed"));
        self.active_weapon
            .subscribe(move |old, new| trace!(actor = %id, ?old, ?new, "Active weapon changed"));
        self
    }

    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            id: self.id,
            owner: self.owner,
            position: self.position,
            fields: vec![
                self.field(ReplicatedField::Health(self.lifecycle.health())),
                self.field(ReplicatedField::IsDead(*self.lifecycle.is_dead.get())),
                self.field(ReplicatedField::ActiveWeapon(*self.active_weapon.get())),
            ],
        }
    }

    /// Stamp `value` with the current sequence of its variable
    fn field(&self, value: ReplicatedField) -> FieldUpdate {
        let seq = match value {
            ReplicatedField::Health(_) => self.lifecycle.health.seq(),
            ReplicatedField::IsDead(_) => self.lifecycle.is_dead.seq(),
            ReplicatedField::ActiveWeapon(_) => self.active_weapon.seq(),
        };
        FieldUpdate { seq, value }
    }
}

/// A transition observed on one replicated variable
#[derive(Debug, Clone)]
enum FieldChange {
    Health(Change<u32>),
    IsDead(Change<bool>),
    ActiveWeapon(Change<WeaponSlot>),
}

/// Host or client instance of the combat core
pub struct Participant {
    registry: ActorRegistry,
    config: Arc<CombatConfig>,
    spatial: Arc<dyn SpatialQuery>,
    actors: HashMap<ActorId, ActorState>,
    timers: TimerArena,
    rng: ChaCha8Rng,
    inbox: VecDeque<Inbound>,
    outbox: Outbox,
    presentation: Vec<PresentationEvent>,
    aim: Aim,
    recoil: Recoil,
}

impl Participant {
    pub fn host(config: Arc<CombatConfig>, spatial: Arc<dyn SpatialQuery>, seed: u64) -> Self {
        Self::new(Role::Host, config, spatial, seed)
    }

    pub fn client(config: Arc<CombatConfig>, spatial: Arc<dyn SpatialQuery>, seed: u64) -> Self {
        Self::new(Role::Client, config, spatial, seed)
    }

    fn new(
        role: Role,
        config: Arc<CombatConfig>,
        spatial: Arc<dyn SpatialQuery>,
        seed: u64,
    ) -> Self {
        Self {
            registry: ActorRegistry::new(role),
            config,
            spatial,
            actors: HashMap::new(),
            timers: TimerArena::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            inbox: VecDeque::new(),
            outbox: Outbox::new(),
            presentation: Vec::new(),
            aim: Aim::default(),
            recoil: Recoil::default(),
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_host(&self) -> bool {
        self.registry.is_host()
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut ActorState> {
        self.actors.get_mut(&id)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn local_actor(&self) -> Option<ActorId> {
        self.registry.local_actor()
    }

    /// Simulation time of this participant
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn timers(&self) -> &TimerArena {
        &self.timers
    }

    pub fn weapon_phase(&self, id: ActorId, slot: WeaponSlot) -> Option<WeaponPhase> {
        self.actors
            .get(&id)
            .map(|actor| actor.loadout.phase(slot, &self.timers))
    }

    pub fn aim(&self) -> Aim {
        self.aim
    }

    pub fn recoil(&self) -> Recoil {
        self.recoil
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub fn enqueue_from_host(&mut self, msg: ServerMsg) {
        self.inbox.push_back(Inbound::FromHost(msg));
    }

    pub fn enqueue_from_client(&mut self, connection: ConnectionId, msg: ClientMsg) {
        self.inbox
            .push_back(Inbound::FromClient { connection, msg });
    }

    pub fn drain_outgoing(&mut self) -> Vec<Outgoing> {
        self.outbox.drain()
    }

    pub fn drain_presentation(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.presentation)
    }

    /// Advance one simulation step.
    ///
    /// All timers due at the new time run before any received message is
    /// applied, so a reload finishing on the tick a death arrives completes
    /// first and is then cancelled state-wise by the death reaction.
    pub fn tick(&mut self, dt: Duration) {
        self.timers.advance(dt);
        while let Some(expired) = self.timers.pop_due() {
            self.on_timer(expired);
        }

        while let Some(inbound) = self.inbox.pop_front() {
            match inbound {
                Inbound::FromHost(msg) => self.handle_server_msg(msg),
                Inbound::FromClient { connection, msg } => self.handle_client_msg(connection, msg),
            }
        }

        self.recoil.apply(&mut self.aim, &mut self.rng);
    }

    // ------------------------------------------------------------------
    // Host: connections
    // ------------------------------------------------------------------

    /// Host mode: spawn an actor controlled by the host process itself
    pub fn spawn_local_player(&mut self) -> Result<ActorId, CombatError> {
        self.registry.require_host("spawn local player")?;
        self.registry.set_local_connection(ConnectionId::HOST);
        self.accept_connection(ConnectionId::HOST)
    }

    /// Spawn an actor for a new connection and bring it up to date
    pub fn accept_connection(&mut self, connection: ConnectionId) -> Result<ActorId, CombatError> {
        self.registry.require_host("accept connection")?;
        if self.registry.actor_of(connection).is_some() {
            return Err(CombatError::InvalidTransition(
                "connection already has an actor",
            ));
        }

        let id = self.registry.allocate()?;
        self.registry.register(id, connection)?;
        let position = self.pick_spawn_point();
        let actor = ActorState::authoritative(id, connection, position, self.config.clone());
        let snapshot = actor.snapshot();

        if connection != ConnectionId::HOST {
            self.outbox.send(
                Recipient::Only(connection),
                ServerMsg::Welcome {
                    connection,
                    actor: id,
                    server_time: unix_millis(),
                },
            );
            for existing in self.actors.values() {
                self.outbox.send(
                    Recipient::Only(connection),
                    ServerMsg::Spawned {
                        actor: existing.snapshot(),
                    },
                );
            }
        }

        self.actors.insert(id, actor);
        self.outbox
            .send(Recipient::All, ServerMsg::Spawned { actor: snapshot });
        self.equip_observed(id, WeaponSlot::Primary);

        info!(
            actor = %id,
            connection = %connection,
            actor_count = self.actors.len(),
            "Actor spawned"
        );
        Ok(id)
    }

    /// Despawn the actor of a departed connection
    pub fn disconnect(&mut self, connection: ConnectionId) -> Option<ActorId> {
        if !self.registry.is_host() {
            return None;
        }
        let id = self.registry.actor_of(connection)?;
        self.inbox.retain(|inbound| {
            !matches!(inbound, Inbound::FromClient { connection: c, .. } if *c == connection)
        });
        self.despawn(id);
        self.outbox
            .send(Recipient::All, ServerMsg::Despawned { actor: id });

        info!(actor = %id, connection = %connection, "Actor despawned");
        Some(id)
    }

    fn despawn(&mut self, id: ActorId) {
        self.timers.cancel_actor(id);
        self.registry.remove(id);
        self.actors.remove(&id);
    }

    fn pick_spawn_point(&mut self) -> Vec3 {
        self.config
            .player
            .spawn_points
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Local input (owning participant only)
    // ------------------------------------------------------------------

    /// The local actor, if it is alive and accepting input
    fn controllable_actor(&self) -> Option<ActorId> {
        let id = self.registry.local_actor()?;
        let actor = self.actors.get(&id)?;
        let presence = actor.lifecycle.presence();
        (actor.lifecycle.is_alive() && presence.input_enabled).then_some(id)
    }

    pub fn press_fire(&mut self) {
        let Some(id) = self.controllable_actor() else {
            return;
        };
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        match actor.loadout.press_trigger(&mut self.timers) {
            TriggerOutcome::Ignored => {}
            TriggerOutcome::Fire | TriggerOutcome::FireAndCadence => self.fire_round(id),
        }
    }

    pub fn release_fire(&mut self) {
        let Some(id) = self.registry.local_actor() else {
            return;
        };
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.loadout.release_trigger(&mut self.timers);
        }
    }

    pub fn request_reload(&mut self) {
        let Some(id) = self.controllable_actor() else {
            return;
        };
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        match actor.loadout.request_reload(&mut self.timers) {
            Ok(slot) => self
                .presentation
                .push(PresentationEvent::ReloadStarted { actor: id, slot }),
            Err(err) => debug!(actor = %id, error = %err, "Reload ignored"),
        }
    }

    /// Ask the host to flip the active weapon
    pub fn switch_weapon(&mut self) {
        if let Some(id) = self.controllable_actor() {
            self.send_request(id, RequestCall::ToggleWeapon);
        }
    }

    /// Client: measure round trip to the host
    pub fn ping(&mut self) {
        if !self.registry.is_host() {
            self.outbox.send_to_host(ClientMsg::Ping { t: unix_millis() });
        }
    }

    pub fn set_aim(&mut self, aim: Aim) {
        self.aim = aim;
    }

    /// Movement collaborator reports where the local actor is
    pub fn set_local_position(&mut self, position: Vec3) {
        if let Some(actor) = self
            .registry
            .local_actor()
            .and_then(|id| self.actors.get_mut(&id))
        {
            actor.position = position;
        }
    }

    fn fire_round(&mut self, id: ActorId) {
        if self.controllable_actor() != Some(id) {
            return;
        }
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        let Some(shot) = actor.loadout.consume_round(&mut self.timers) else {
            return;
        };
        let origin = actor.position + Vec3::Y * EYE_HEIGHT;

        if shot.reload_started {
            self.presentation.push(PresentationEvent::ReloadStarted {
                actor: id,
                slot: shot.slot,
            });
        }

        let calls = CombatSystem::resolve_shot(
            self.spatial.as_ref(),
            origin,
            self.aim.forward(),
            &shot,
            LayerMask::ALL,
        );
        for call in calls {
            self.send_request(id, call);
        }
    }

    /// Requests from the host's own player run in-process
    fn send_request(&mut self, actor: ActorId, call: RequestCall) {
        if self.registry.is_host() {
            let connection = self
                .registry
                .local_connection()
                .unwrap_or(ConnectionId::HOST);
            self.handle_request(connection, actor, call);
        } else {
            self.outbox.request(actor, call);
        }
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    fn on_timer(&mut self, expired: Expired) {
        let id = expired.key.actor;
        match expired.key.purpose {
            TimerPurpose::Cooldown(slot) => {
                trace!(actor = %id, ?slot, "Cooldown over");
            }
            TimerPurpose::Cadence => {
                let fire = self.registry.is_local(id)
                    && self
                        .actors
                        .get_mut(&id)
                        .map(|a| a.loadout.on_cadence_tick(expired.deadline, &mut self.timers))
                        .unwrap_or(false);
                if fire {
                    self.fire_round(id);
                }
            }
            TimerPurpose::Reload(slot) => {
                if let Some(actor) = self.actors.get_mut(&id) {
                    actor.loadout.complete_reload(slot);
                    self.presentation
                        .push(PresentationEvent::ReloadFinished { actor: id, slot });
                }
            }
            TimerPurpose::Respawn => self.respawn(id),
        }
    }

    /// Host: move the actor to a spawn point, tell its owner, then revive it
    fn respawn(&mut self, id: ActorId) {
        if !self.registry.is_host() {
            return;
        }
        let position = self.pick_spawn_point();
        match self.actors.get_mut(&id) {
            Some(actor) => actor.position = position,
            None => return,
        }

        self.broadcast(BroadcastEvent::Teleport {
            actor: id,
            position,
        });

        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        match actor.lifecycle.revive() {
            Ok(changes) => {
                info!(actor = %id, x = position.x, y = position.y, z = position.z, "Actor respawned");
                self.publish_lifecycle(id, changes);
            }
            Err(err) => warn!(actor = %id, error = %err, "Respawn skipped"),
        }
    }

    // ------------------------------------------------------------------
    // Host: requests and replication
    // ------------------------------------------------------------------

    fn handle_client_msg(&mut self, connection: ConnectionId, msg: ClientMsg) {
        if !self.registry.is_host() {
            warn!(connection = %connection, "Client message delivered to a non-host");
            return;
        }
        match msg {
            ClientMsg::Request { actor, call } => self.handle_request(connection, actor, call),
            ClientMsg::Ping { t } => self
                .outbox
                .send(Recipient::Only(connection), ServerMsg::Pong { t }),
        }
    }

    fn handle_request(&mut self, connection: ConnectionId, actor: ActorId, call: RequestCall) {
        if let Err(err) = CombatSystem::authorize(&self.registry, connection, actor) {
            match err {
                CombatError::TargetMissing(_) => {
                    debug!(connection = %connection, actor = %actor, "Dropping request for missing actor")
                }
                _ => warn!(connection = %connection, actor = %actor, error = %err, "Rejected request"),
            }
            return;
        }

        match call {
            RequestCall::Damage { target, amount } => {
                self.apply_damage_request(connection, target, amount)
            }
            RequestCall::ToggleWeapon => self.toggle_weapon(actor),
            effect_call => match CombatSystem::effect_for(actor, &effect_call) {
                Some(effect) => self.broadcast(BroadcastEvent::Effect { effect }),
                None => warn!(actor = %actor, ?effect_call, "Malformed effect request"),
            },
        }
    }

    fn apply_damage_request(&mut self, connection: ConnectionId, target: ActorId, amount: u32) {
        let amount = match CombatSystem::validate_damage(
            connection,
            amount,
            self.config.max_weapon_damage(),
        ) {
            Ok(amount) => amount,
            Err(err) => {
                warn!(error = %err, "Rejected damage request");
                return;
            }
        };

        let Some(victim) = self.actors.get_mut(&target) else {
            warn!(victim = %target, connection = %connection, "Damage target not found");
            return;
        };
        match victim.lifecycle.take_damage(amount) {
            Ok(changes) => {
                debug!(victim = %target, amount, health = victim.lifecycle.health(), "Damage applied");
                self.publish_lifecycle(target, changes);
            }
            Err(err) => warn!(victim = %target, error = %err, "Damage ignored"),
        }
    }

    fn toggle_weapon(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        let next = actor.active_weapon.get().other();
        match actor.active_weapon.set(next) {
            Ok(Some(change)) => {
                self.publish(id, ReplicatedField::ActiveWeapon(change.new));
                self.react(id, FieldChange::ActiveWeapon(change));
            }
            Ok(None) => {}
            Err(err) => warn!(actor = %id, error = %err, "Weapon toggle failed"),
        }
    }

    /// Host -> all, applied locally on the same path clients use
    fn broadcast(&mut self, event: BroadcastEvent) {
        self.outbox.broadcast(event.clone());
        self.apply_broadcast(event);
    }

    fn publish_lifecycle(&mut self, id: ActorId, changes: LifecycleChanges) {
        if let Some(change) = changes.health {
            self.publish(id, ReplicatedField::Health(change.new));
            self.react(id, FieldChange::Health(change));
        }
        if let Some(change) = changes.is_dead {
            self.publish(id, ReplicatedField::IsDead(change.new));
            self.react(id, FieldChange::IsDead(change));
        }
    }

    /// Queue a replicated transition for every client
    fn publish(&mut self, id: ActorId, value: ReplicatedField) {
        let Some(actor) = self.actors.get(&id) else {
            return;
        };
        let update = actor.field(value);
        self.outbox.send(
            Recipient::All,
            ServerMsg::Replicate { actor: id, update },
        );
    }

    // ------------------------------------------------------------------
    // Client: host messages
    // ------------------------------------------------------------------

    fn handle_server_msg(&mut self, msg: ServerMsg) {
        if self.registry.is_host() {
            warn!("Host message delivered to the host");
            return;
        }
        match msg {
            ServerMsg::Welcome {
                connection, actor, ..
            } => {
                self.registry.set_local_connection(connection);
                info!(connection = %connection, actor = %actor, "Joined session");
            }
            ServerMsg::Spawned { actor } => self.spawn_mirror(actor),
            ServerMsg::Despawned { actor } => {
                if self.actors.contains_key(&actor) {
                    self.despawn(actor);
                    debug!(actor = %actor, "Mirror despawned");
                }
            }
            ServerMsg::Replicate { actor, update } => self.apply_update(actor, update),
            ServerMsg::Broadcast { event } => self.apply_broadcast(event),
            ServerMsg::Pong { t } => {
                trace!(rtt_ms = unix_millis().saturating_sub(t), "Pong");
            }
        }
    }

    fn spawn_mirror(&mut self, snapshot: ActorSnapshot) {
        if self.actors.contains_key(&snapshot.id) {
            return;
        }
        if let Err(err) = self.registry.register(snapshot.id, snapshot.owner) {
            warn!(actor = %snapshot.id, error = %err, "Ignoring spawn");
            return;
        }
        let actor = ActorState::from_snapshot(&snapshot, self.config.clone());
        let active = *actor.active_weapon.get();
        self.actors.insert(snapshot.id, actor);
        self.equip_observed(snapshot.id, active);
        debug!(actor = %snapshot.id, local = self.registry.is_local(snapshot.id), "Mirror spawned");
    }

    fn apply_update(&mut self, id: ActorId, update: FieldUpdate) {
        let Some(actor) = self.actors.get_mut(&id) else {
            debug!(actor = %id, seq = update.seq, "Dropping update for missing actor");
            return;
        };
        let change = match update.value {
            ReplicatedField::Health(v) => actor
                .lifecycle
                .health
                .receive(update.seq, v)
                .map(FieldChange::Health),
            ReplicatedField::IsDead(v) => actor
                .lifecycle
                .is_dead
                .receive(update.seq, v)
                .map(FieldChange::IsDead),
            ReplicatedField::ActiveWeapon(v) => actor
                .active_weapon
                .receive(update.seq, v)
                .map(FieldChange::ActiveWeapon),
        };
        if let Some(change) = change {
            self.react(id, change);
        }
    }

    // ------------------------------------------------------------------
    // Reactions, run identically on host and clients
    // ------------------------------------------------------------------

    fn apply_broadcast(&mut self, event: BroadcastEvent) {
        let id = event.actor();
        if !self.actors.contains_key(&id) {
            debug!(actor = %id, "Dropping broadcast for missing actor");
            return;
        }
        match event {
            BroadcastEvent::Effect { effect } => {
                if let CombatEffect::MuzzleFlash { shooter, recoil } = effect {
                    if self.registry.is_local(shooter) {
                        self.recoil.add(recoil);
                    }
                }
                self.presentation.push(PresentationEvent::Effect(effect));
            }
            BroadcastEvent::Teleport { actor, position } => {
                if !self.registry.is_local(actor) {
                    return;
                }
                if let Some(state) = self.actors.get_mut(&actor) {
                    state.position = position;
                }
                self.presentation
                    .push(PresentationEvent::Teleported { actor, position });
            }
        }
    }

    fn react(&mut self, id: ActorId, change: FieldChange) {
        match change {
            FieldChange::Health(c) => self.presentation.push(PresentationEvent::HealthChanged {
                actor: id,
                old: c.old,
                new: c.new,
            }),
            FieldChange::IsDead(c) if c.new => self.on_death(id),
            FieldChange::IsDead(_) => self.on_revive(id),
            FieldChange::ActiveWeapon(c) => self.equip_observed(id, c.new),
        }
    }

    fn on_death(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        actor.lifecycle.disable();
        actor.loadout.cancel_all(&mut self.timers);
        self.presentation.push(PresentationEvent::Died { actor: id });

        if self.registry.is_host() {
            self.timers.schedule(
                TimerKey::new(id, TimerPurpose::Respawn),
                self.config.player.respawn_duration(),
            );
        }
        info!(actor = %id, "Actor died");
    }

    fn on_revive(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        actor.lifecycle.enable();
        self.presentation
            .push(PresentationEvent::Respawned { actor: id });
    }

    fn equip_observed(&mut self, id: ActorId, slot: WeaponSlot) {
        let local = self.registry.is_local(id);
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        match actor.loadout.equip(slot, &mut self.timers) {
            Ok(()) => {
                let graphics = actor.loadout.weapon(slot).graphics.clone().unwrap_or_default();
                self.presentation.push(PresentationEvent::WeaponEquipped {
                    actor: id,
                    slot,
                    graphics,
                    local,
                });
            }
            Err(err) => error!(actor = %id, error = %err, "Equip aborted"),
        }
    }
}
