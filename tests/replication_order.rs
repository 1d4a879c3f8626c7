use std::sync::Arc;

use arena_combat_server::config::CombatConfig;
use arena_combat_server::game::{EmptyScene, Participant, PresentationEvent};
use arena_combat_server::replication::{ActorId, ConnectionId};
use arena_combat_server::util::time::tick_delta;
use arena_combat_server::ws::protocol::{
    ActorSnapshot, BroadcastEvent, CombatEffect, FieldUpdate, ReplicatedField, ServerMsg,
    WeaponSlot,
};
use glam::Vec3;

fn snapshot(id: ActorId, owner: ConnectionId) -> ActorSnapshot {
    ActorSnapshot {
        id,
        owner,
        position: Vec3::ZERO,
        fields: vec![
            FieldUpdate {
                seq: 0,
                value: ReplicatedField::Health(100),
            },
            FieldUpdate {
                seq: 0,
                value: ReplicatedField::IsDead(false),
            },
            FieldUpdate {
                seq: 0,
                value: ReplicatedField::ActiveWeapon(WeaponSlot::Primary),
            },
        ],
    }
}

fn health(seq: u64, value: u32) -> FieldUpdate {
    FieldUpdate {
        seq,
        value: ReplicatedField::Health(value),
    }
}

fn client_with(actor: ActorId) -> Participant {
    let mut client = Participant::client(Arc::new(CombatConfig::default()), Arc::new(EmptyScene), 9);
    client.enqueue_from_host(ServerMsg::Spawned {
        actor: snapshot(actor, ConnectionId::new_v4()),
    });
    client.tick(tick_delta());
    client.drain_presentation();
    client
}

#[test]
fn stale_update_never_overwrites_newer_value() {
    let actor = ActorId(1);
    let mut client = client_with(actor);

    client.enqueue_from_host(ServerMsg::Replicate {
        actor,
        update: health(2, 50),
    });
    client.enqueue_from_host(ServerMsg::Replicate {
        actor,
        update: health(1, 80),
    });
    client.tick(tick_delta());

    assert_eq!(client.actor(actor).unwrap().lifecycle.health(), 50);
    assert_eq!(
        client.drain_presentation(),
        vec![PresentationEvent::HealthChanged {
            actor,
            old: 100,
            new: 50
        }]
    );
}

#[test]
fn health_zero_before_death_flag_is_a_transient() {
    let actor = ActorId(4);
    let mut client = client_with(actor);

    client.enqueue_from_host(ServerMsg::Replicate {
        actor,
        update: health(1, 0),
    });
    client.tick(tick_delta());
    let mirror = client.actor(actor).unwrap();
    assert_eq!(mirror.lifecycle.health(), 0);
    assert!(mirror.lifecycle.is_alive());

    client.enqueue_from_host(ServerMsg::Replicate {
        actor,
        update: FieldUpdate {
            seq: 1,
            value: ReplicatedField::IsDead(true),
        },
    });
    client.tick(tick_delta());
    assert!(!client.actor(actor).unwrap().lifecycle.is_alive());
    assert!(client
        .drain_presentation()
        .contains(&PresentationEvent::Died { actor }));
}

#[test]
fn traffic_for_unknown_actor_is_dropped() {
    let mut client = client_with(ActorId(1));
    let ghost = ActorId(77);

    client.enqueue_from_host(ServerMsg::Replicate {
        actor: ghost,
        update: health(5, 10),
    });
    client.enqueue_from_host(ServerMsg::Broadcast {
        event: BroadcastEvent::Effect {
            effect: CombatEffect::MuzzleFlash {
                shooter: ghost,
                recoil: 2.0,
            },
        },
    });
    client.tick(tick_delta());

    assert!(client.actor(ghost).is_none());
    assert!(client.drain_presentation().is_empty());
    assert_eq!(client.recoil().force(), 0.0);
}

#[test]
fn despawn_then_duplicate_spawn_is_ignored() {
    let actor = ActorId(2);
    let owner = ConnectionId::new_v4();
    let mut client = client_with(ActorId(1));

    client.enqueue_from_host(ServerMsg::Spawned {
        actor: snapshot(actor, owner),
    });
    client.enqueue_from_host(ServerMsg::Spawned {
        actor: snapshot(actor, owner),
    });
    client.tick(tick_delta());
    assert_eq!(client.actor_count(), 2);

    client.enqueue_from_host(ServerMsg::Despawned { actor });
    client.tick(tick_delta());
    assert_eq!(client.actor_count(), 1);
    assert!(client.registry().owner(actor).is_none());
}
