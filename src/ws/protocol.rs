//! WebSocket protocol message definitions
//! These are the wire types for host <-> client communication

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::replication::{ActorId, ConnectionId};

/// Weapon slots carried by every actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSlot {
    Primary,
    Secondary,
}

impl WeaponSlot {
    pub const ALL: [WeaponSlot; 2] = [WeaponSlot::Primary, WeaponSlot::Secondary];

    pub fn index(self) -> usize {
        match self {
            WeaponSlot::Primary => 0,
            WeaponSlot::Secondary => 1,
        }
    }

    /// The slot a toggle switches to
    pub fn other(self) -> Self {
        match self {
            WeaponSlot::Primary => WeaponSlot::Secondary,
            WeaponSlot::Secondary => WeaponSlot::Primary,
        }
    }
}

impl Default for WeaponSlot {
    fn default() -> Self {
        Self::Primary
    }
}

/// Surface an impact effect renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactMaterial {
    /// A player was hit
    Metal,
    /// World geometry was hit
    Stone,
}

/// Messages sent from client to host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Invoke a host-side call on an actor the sender owns
    Request { actor: ActorId, call: RequestCall },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Host-side calls a client may request. None of them has a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum RequestCall {
    /// Apply weapon damage to another actor
    Damage { target: ActorId, amount: u32 },

    /// Fan out an impact effect
    Impact {
        material: ImpactMaterial,
        point: Vec3,
        normal: Vec3,
    },

    /// Fan out muzzle flash, shot audio and recoil
    Shot { recoil: f32 },

    /// Flip the active weapon slot
    ToggleWeapon,
}

/// Messages sent from host to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Sent once to a freshly accepted connection
    Welcome {
        connection: ConnectionId,
        actor: ActorId,
        server_time: u64,
    },

    /// An actor exists (late-join snapshot or fresh spawn)
    Spawned { actor: ActorSnapshot },

    /// An actor was destroyed
    Despawned { actor: ActorId },

    /// One replicated variable transition
    Replicate { actor: ActorId, update: FieldUpdate },

    /// Host -> all one-way call
    Broadcast { event: BroadcastEvent },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Full state of an actor at spawn time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub owner: ConnectionId,
    pub position: Vec3,
    /// Every replicated field with its current sequence
    pub fields: Vec<FieldUpdate>,
}

/// A replicated value stamped with the host's per-variable sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldUpdate {
    pub seq: u64,
    pub value: ReplicatedField,
}

/// The replicated variables of an actor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ReplicatedField {
    Health(u32),
    IsDead(bool),
    ActiveWeapon(WeaponSlot),
}

/// Host -> all events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BroadcastEvent {
    /// Visual/audio combat effect
    Effect { effect: CombatEffect },

    /// The owner of `actor` snaps its transform to `position`
    Teleport { actor: ActorId, position: Vec3 },
}

impl BroadcastEvent {
    /// Actor the event is addressed to
    pub fn actor(&self) -> ActorId {
        match self {
            BroadcastEvent::Effect { effect } => effect.shooter(),
            BroadcastEvent::Teleport { actor, .. } => *actor,
        }
    }
}

/// Ephemeral combat effect, never stored or replayed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CombatEffect {
    Impact {
        shooter: ActorId,
        material: ImpactMaterial,
        point: Vec3,
        normal: Vec3,
    },
    MuzzleFlash {
        shooter: ActorId,
        recoil: f32,
    },
}

impl CombatEffect {
    pub fn shooter(&self) -> ActorId {
        match self {
            CombatEffect::Impact { shooter, .. } | CombatEffect::MuzzleFlash { shooter, .. } => {
                *shooter
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let msg = ClientMsg::Request {
            actor: ActorId(3),
            call: RequestCall::Damage {
                target: ActorId(7),
                amount: 10,
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "request");
        assert_eq!(json["actor"], 3);
        assert_eq!(json["call"]["call"], "damage");
        assert_eq!(json["call"]["target"], 7);
    }

    #[test]
    fn test_toggle_weapon_parses() {
        let text = r#"{"type":"request","actor":1,"call":{"call":"toggle_weapon"}}"#;
        let msg: ClientMsg = serde_json::from_str(text).unwrap();
        assert_eq!(
            msg,
            ClientMsg::Request {
                actor: ActorId(1),
                call: RequestCall::ToggleWeapon
            }
        );
    }

    #[test]
    fn test_replicate_field_shape() {
        let msg = ServerMsg::Replicate {
            actor: ActorId(2),
            update: FieldUpdate {
                seq: 4,
                value: ReplicatedField::IsDead(true),
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["update"]["value"]["field"], "is_dead");
        assert_eq!(json["update"]["value"]["value"], true);
    }
}
