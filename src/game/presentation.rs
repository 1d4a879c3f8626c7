//! Events handed to the presentation layer (animation, particles, audio, HUD)
//!
//! Presentation only reads these; nothing flows back into the combat core.

use glam::Vec3;

use crate::replication::ActorId;
use crate::ws::protocol::{CombatEffect, WeaponSlot};

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    HealthChanged { actor: ActorId, old: u32, new: u32 },
    Died { actor: ActorId },
    Respawned { actor: ActorId },
    Teleported { actor: ActorId, position: Vec3 },
    /// Instantiate `graphics` for `slot`, dropping the previous weapon model
    WeaponEquipped {
        actor: ActorId,
        slot: WeaponSlot,
        graphics: String,
        /// Local shots play as 2D audio
        local: bool,
    },
    ReloadStarted { actor: ActorId, slot: WeaponSlot },
    ReloadFinished { actor: ActorId, slot: WeaponSlot },
    Effect(CombatEffect),
}
