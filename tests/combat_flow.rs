mod common;

use std::time::Duration;

use arena_combat_server::config::CombatConfig;
use arena_combat_server::game::PresentationEvent;
use arena_combat_server::ws::protocol::{ClientMsg, RequestCall, WeaponSlot};
use common::Loopback;
use glam::Vec3;

fn lethal_config() -> CombatConfig {
    let mut config = CombatConfig::default();
    config.primary.damage = 40;
    config
}

/// Hold the trigger of client `index` for `ticks` ticks
fn burst(net: &mut Loopback, index: usize, ticks: usize) {
    net.clients[index].participant.press_fire();
    for _ in 0..ticks {
        net.tick();
    }
    net.clients[index].participant.release_fire();
    net.tick();
}

#[test]
fn kill_and_respawn_replicate_to_every_participant() {
    let mut net = Loopback::new(lethal_config());
    let a = net.connect();
    let b = net.connect();
    let victim = net.clients[b].actor();
    net.scene.aim_at(Some(victim));

    burst(&mut net, a, 12);

    let host_state = net.host.actor(victim).unwrap();
    assert_eq!(host_state.lifecycle.health(), 0);
    assert!(!host_state.lifecycle.is_alive());
    for client in &net.clients {
        let mirror = client.participant.actor(victim).unwrap();
        assert_eq!(mirror.lifecycle.health(), 0);
        assert!(!mirror.lifecycle.is_alive());
    }

    let healths: Vec<u32> = net.clients[b]
        .events
        .iter()
        .filter_map(|e| match e {
            PresentationEvent::HealthChanged { actor, new, .. } if *actor == victim => Some(*new),
            _ => None,
        })
        .collect();
    assert_eq!(healths, vec![60, 20, 0]);
    let deaths = net.clients[b]
        .events
        .iter()
        .filter(|e| **e == PresentationEvent::Died { actor: victim })
        .count();
    assert_eq!(deaths, 1);

    // The dead player's input is suppressed
    let presence = net.clients[b].participant.actor(victim).unwrap().lifecycle.presence();
    assert!(!presence.input_enabled);
    assert!(!presence.colliders_enabled);
    net.clients[b].participant.press_fire();
    assert!(net.clients[b].participant.drain_outgoing().is_empty());

    net.tick_for(Duration::from_millis(3200));

    assert_eq!(net.host.actor(victim).unwrap().lifecycle.health(), 100);
    for client in &net.clients {
        let mirror = client.participant.actor(victim).unwrap();
        assert!(mirror.lifecycle.is_alive());
        assert_eq!(mirror.lifecycle.health(), 100);
    }

    let spawn = Vec3::new(0.0, 10.0, 0.0);
    let owner = &net.clients[b];
    assert_eq!(owner.participant.actor(victim).unwrap().position, spawn);
    assert!(owner.events.contains(&PresentationEvent::Teleported {
        actor: victim,
        position: spawn
    }));
    assert!(owner
        .events
        .contains(&PresentationEvent::Respawned { actor: victim }));
    assert!(owner.participant.actor(victim).unwrap().lifecycle.presence().input_enabled);
}

#[test]
fn slow_link_observes_transitions_in_host_order() {
    let mut net = Loopback::new(lethal_config());
    let a = net.connect();
    let b = net.connect();
    let slow = net.connect_with_delay(20);
    let victim = net.clients[b].actor();
    net.scene.aim_at(Some(victim));

    burst(&mut net, a, 12);
    // The slow observer lags behind the host
    assert!(net.clients[slow].participant.actor(victim).unwrap().lifecycle.is_alive());

    net.tick_for(Duration::from_secs(1));
    let seen: Vec<PresentationEvent> = net.clients[slow]
        .events
        .iter()
        .filter(|e| {
            matches!(e, PresentationEvent::HealthChanged { actor, .. } | PresentationEvent::Died { actor } if *actor == victim)
        })
        .cloned()
        .collect();
    assert_eq!(
        seen,
        vec![
            PresentationEvent::HealthChanged { actor: victim, old: 100, new: 60 },
            PresentationEvent::HealthChanged { actor: victim, old: 60, new: 20 },
            PresentationEvent::HealthChanged { actor: victim, old: 20, new: 0 },
            PresentationEvent::Died { actor: victim },
        ]
    );
}

#[test]
fn late_joiner_sees_dead_actor_disabled() {
    let mut net = Loopback::new(lethal_config());
    let a = net.connect();
    let b = net.connect();
    let victim = net.clients[b].actor();
    net.scene.aim_at(Some(victim));
    burst(&mut net, a, 12);

    let c = net.connect();
    let mirror = net.clients[c].participant.actor(victim).unwrap();
    assert!(!mirror.lifecycle.is_alive());
    assert_eq!(mirror.lifecycle.health(), 0);
    assert!(!mirror.lifecycle.presence().colliders_enabled);
}

#[test]
fn damage_to_departed_target_is_dropped() {
    let mut net = Loopback::new(CombatConfig::default());
    let a = net.connect();
    let b = net.connect();
    let shooter = net.clients[a].actor();
    let victim = net.clients[b].actor();

    net.disconnect(b);

    // The request was already in flight when the target left
    let connection = net.clients[a].connection;
    net.host.enqueue_from_client(
        connection,
        ClientMsg::Request {
            actor: shooter,
            call: RequestCall::Damage {
                target: victim,
                amount: 10,
            },
        },
    );
    net.tick();

    assert!(net.host.actor(victim).is_none());
    assert!(net.clients[a].participant.actor(victim).is_none());
    assert!(!net.clients[a].events.iter().any(|e| matches!(
        e,
        PresentationEvent::HealthChanged { actor, .. } if *actor == victim
    )));
    assert_eq!(net.host.actor_count(), 1);
}

#[test]
fn request_for_foreign_actor_is_rejected() {
    let mut net = Loopback::new(CombatConfig::default());
    let a = net.connect();
    let b = net.connect();
    let target = net.clients[a].actor();

    let intruder = net.clients[b].connection;
    net.host.enqueue_from_client(
        intruder,
        ClientMsg::Request {
            actor: target,
            call: RequestCall::ToggleWeapon,
        },
    );
    net.tick();

    assert_eq!(
        *net.host.actor(target).unwrap().active_weapon.get(),
        WeaponSlot::Primary
    );
    assert_eq!(
        net.clients[a].participant.actor(target).unwrap().active_weapon.seq(),
        0
    );
}

#[test]
fn weapon_switch_round_trip_keeps_per_slot_state() {
    let mut net = Loopback::new(CombatConfig::default());
    let a = net.connect();
    let b = net.connect();
    let actor = net.clients[a].actor();

    for _ in 0..5 {
        net.clients[a].participant.press_fire();
        net.clients[a].participant.release_fire();
        net.tick();
    }
    let loadout = &net.clients[a].participant.actor(actor).unwrap().loadout;
    assert_eq!(loadout.state(WeaponSlot::Primary).ammo, 25);

    net.clients[a].participant.switch_weapon();
    net.tick();

    let owner = net.clients[a].participant.actor(actor).unwrap();
    assert_eq!(owner.loadout.equipped(), Some(WeaponSlot::Secondary));
    assert_eq!(
        *net.host.actor(actor).unwrap().active_weapon.get(),
        WeaponSlot::Secondary
    );
    assert_eq!(
        *net.clients[b].participant.actor(actor).unwrap().active_weapon.get(),
        WeaponSlot::Secondary
    );
    assert!(net.clients[a].events.iter().any(|e| matches!(
        e,
        PresentationEvent::WeaponEquipped { actor: who, slot: WeaponSlot::Secondary, local: true, .. } if *who == actor
    )));
    assert!(net.clients[b].events.iter().any(|e| matches!(
        e,
        PresentationEvent::WeaponEquipped { actor: who, slot: WeaponSlot::Secondary, local: false, .. } if *who == actor
    )));

    net.clients[a].participant.switch_weapon();
    net.tick();

    let loadout = &net.clients[a].participant.actor(actor).unwrap().loadout;
    assert_eq!(loadout.equipped(), Some(WeaponSlot::Primary));
    assert_eq!(loadout.state(WeaponSlot::Primary).ammo, 25);
    assert_eq!(loadout.state(WeaponSlot::Secondary).ammo, 12);
}

#[test]
fn death_abandons_pending_reload() {
    let mut net = Loopback::new(lethal_config());
    let a = net.connect();
    let b = net.connect();
    let victim = net.clients[a].actor();

    for _ in 0..5 {
        net.clients[a].participant.press_fire();
        net.clients[a].participant.release_fire();
        net.tick();
    }
    net.clients[a].participant.request_reload();
    net.tick();
    assert!(net.clients[a].events.contains(&PresentationEvent::ReloadStarted {
        actor: victim,
        slot: WeaponSlot::Primary
    }));

    net.scene.aim_at(Some(victim));
    burst(&mut net, b, 12);
    assert!(!net.clients[a].participant.actor(victim).unwrap().lifecycle.is_alive());

    net.tick_for(Duration::from_secs(2));

    let state = net.clients[a]
        .participant
        .actor(victim)
        .unwrap()
        .loadout
        .state(WeaponSlot::Primary);
    assert_eq!(state.ammo, 25);
    assert!(!state.is_reloading);
    assert!(!net.clients[a]
        .events
        .iter()
        .any(|e| matches!(e, PresentationEvent::ReloadFinished { .. })));
}

#[test]
fn shooter_recoil_comes_back_from_host() {
    let mut net = Loopback::new(CombatConfig::default());
    let a = net.connect();
    let b = net.connect();
    let shooter = net.clients[a].actor();

    net.clients[a].participant.press_fire();
    net.clients[a].participant.release_fire();

    // Recoil is applied when the flash arrives, not when the round is fired
    assert_eq!(net.clients[a].participant.recoil().force(), 0.0);
    net.tick();

    assert!(net.clients[a].participant.aim().pitch > 0.0);
    assert_eq!(common::count_muzzle_flashes(&net.clients[b].events, shooter), 1);
    assert_eq!(common::count_muzzle_flashes(&net.host_events, shooter), 1);
}
