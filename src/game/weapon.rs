//! Weapon state machine: ammo, cooldown, cadence and reload per slot
//!
//! Runs on the participant that owns the actor. Deferred work (cooldown,
//! cadence ticks, reloads) lives in the participant's [`TimerArena`].

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::{CombatConfig, WeaponConfig};
use crate::error::CombatError;
use crate::replication::ActorId;
use crate::ws::protocol::WeaponSlot;

use super::timers::{TimerArena, TimerKey, TimerPurpose};

/// First shots of a trigger pull kick less
const DAMPED_SHOTS: u32 = 3;
const DAMPED_RECOIL_FACTOR: f32 = 0.2;

/// Observable phase of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponPhase {
    Ready,
    /// Single-shot weapon waiting out its cooldown
    Cooldown,
    /// Automatic weapon with the trigger held
    Cadence,
    Reloading,
}

/// Per-slot magazine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponState {
    pub ammo: u32,
    pub is_reloading: bool,
}

/// One round leaving the barrel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub slot: WeaponSlot,
    pub damage: u32,
    pub range: f32,
    pub recoil: f32,
    /// The magazine ran dry and a reload was started
    pub reload_started: bool,
}

/// What pressing the trigger did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Nothing equipped, reloading, cooling down or already firing
    Ignored,
    /// Fire one round now
    Fire,
    /// Fire one round now and keep firing on cadence ticks
    FireAndCadence,
}

/// Both weapon slots of one actor
#[derive(Debug)]
pub struct Loadout {
    actor: ActorId,
    config: Arc<CombatConfig>,
    slots: [WeaponState; 2],
    equipped: Option<WeaponSlot>,
    trigger_held: bool,
    burst_shots: u32,
}

impl Loadout {
    /// Full magazines, nothing equipped yet
    pub fn new(actor: ActorId, config: Arc<CombatConfig>) -> Self {
        let slots = WeaponSlot::ALL.map(|slot| WeaponState {
            ammo: config.weapon(slot).magazine_capacity,
            is_reloading: false,
        });
        Self {
            actor,
            config,
            slots,
            equipped: None,
            trigger_held: false,
            burst_shots: 0,
        }
    }

    pub fn equipped(&self) -> Option<WeaponSlot> {
        self.equipped
    }

    pub fn state(&self, slot: WeaponSlot) -> WeaponState {
        self.slots[slot.index()]
    }

    pub fn weapon(&self, slot: WeaponSlot) -> &WeaponConfig {
        self.config.weapon(slot)
    }

    pub fn trigger_held(&self) -> bool {
        self.trigger_held
    }

    pub fn phase(&self, slot: WeaponSlot, timers: &TimerArena) -> WeaponPhase {
        if self.slots[slot.index()].is_reloading {
            WeaponPhase::Reloading
        } else if self.equipped == Some(slot)
            && self.trigger_held
            && timers.is_pending(self.key(TimerPurpose::Cadence))
        {
            WeaponPhase::Cadence
        } else if timers.is_pending(self.key(TimerPurpose::Cooldown(slot))) {
            WeaponPhase::Cooldown
        } else {
            WeaponPhase::Ready
        }
    }

    /// Put `slot` in hand. Fails if the weapon has no presentation asset,
    /// in which case the previous weapon stays equipped.
    pub fn equip(&mut self, slot: WeaponSlot, timers: &mut TimerArena) -> Result<(), CombatError> {
        let weapon = self.config.weapon(slot);
        if weapon.graphics.is_none() {
            return Err(CombatError::EquipFailed {
                slot,
                weapon: weapon.name.clone(),
                reason: "missing weapon graphics",
            });
        }
        if self.equipped != Some(slot) {
            // A held trigger belongs to the weapon being put away
            timers.cancel(self.key(TimerPurpose::Cadence));
            self.trigger_held = false;
        }
        self.equipped = Some(slot);
        Ok(())
    }

    /// Trigger pressed. Schedules cooldown or cadence as the weapon requires.
    pub fn press_trigger(&mut self, timers: &mut TimerArena) -> TriggerOutcome {
        let Some(slot) = self.equipped else {
            return TriggerOutcome::Ignored;
        };
        if self.slots[slot.index()].is_reloading {
            return TriggerOutcome::Ignored;
        }

        let weapon = self.config.weapon(slot);
        match weapon.cadence_period() {
            None => {
                let cooldown = self.key(TimerPurpose::Cooldown(slot));
                if timers.is_pending(cooldown) {
                    return TriggerOutcome::Ignored;
                }
                timers.schedule(cooldown, weapon.cooldown());
                self.burst_shots = 0;
                TriggerOutcome::Fire
            }
            Some(period) => {
                let cadence = self.key(TimerPurpose::Cadence);
                if timers.is_pending(cadence) {
                    return TriggerOutcome::Ignored;
                }
                self.trigger_held = true;
                self.burst_shots = 0;
                timers.schedule(cadence, period);
                TriggerOutcome::FireAndCadence
            }
        }
    }

    /// Trigger released. No shot fires after this, even one already due.
    pub fn release_trigger(&mut self, timers: &mut TimerArena) {
        self.trigger_held = false;
        timers.cancel(self.key(TimerPurpose::Cadence));
    }

    /// A cadence tick expired. Returns true if a round should be attempted.
    pub fn on_cadence_tick(&mut self, deadline: Duration, timers: &mut TimerArena) -> bool {
        if !self.trigger_held {
            return false;
        }
        let Some(period) = self
            .equipped
            .and_then(|slot| self.config.weapon(slot).cadence_period())
        else {
            self.trigger_held = false;
            return false;
        };
        timers.schedule_at(self.key(TimerPurpose::Cadence), deadline + period);
        true
    }

    /// Spend one round from the equipped weapon, starting a reload when the
    /// magazine runs dry.
    pub fn consume_round(&mut self, timers: &mut TimerArena) -> Option<Shot> {
        let slot = self.equipped?;
        let state = &mut self.slots[slot.index()];
        if state.ammo == 0 || state.is_reloading {
            return None;
        }
        state.ammo -= 1;
        let emptied = state.ammo == 0;

        let reload_started = emptied && self.begin_reload(slot, timers);

        self.burst_shots += 1;
        let weapon = self.config.weapon(slot);
        let recoil = if self.burst_shots <= DAMPED_SHOTS {
            weapon.recoil_force * DAMPED_RECOIL_FACTOR
        } else {
            weapon.recoil_force
        };

        Some(Shot {
            slot,
            damage: weapon.damage,
            range: weapon.range,
            recoil,
            reload_started,
        })
    }

    /// Explicit reload of the equipped weapon
    pub fn request_reload(&mut self, timers: &mut TimerArena) -> Result<WeaponSlot, CombatError> {
        let slot = self
            .equipped
            .ok_or(CombatError::InvalidTransition("no weapon equipped"))?;
        let state = self.slots[slot.index()];
        if state.is_reloading {
            return Err(CombatError::InvalidTransition("already reloading"));
        }
        if state.ammo == self.config.weapon(slot).magazine_capacity {
            return Err(CombatError::InvalidTransition("magazine is full"));
        }
        self.begin_reload(slot, timers);
        Ok(slot)
    }

    /// Reload timer for `slot` expired
    pub fn complete_reload(&mut self, slot: WeaponSlot) {
        let capacity = self.config.weapon(slot).magazine_capacity;
        let state = &mut self.slots[slot.index()];
        if !state.is_reloading {
            return;
        }
        state.ammo = capacity;
        state.is_reloading = false;
        debug!(actor = %self.actor, ?slot, ammo = capacity, "Reload complete");
    }

    /// Drop all pending weapon work, as on death or despawn.
    /// Partially elapsed reloads are abandoned, not completed.
    pub fn cancel_all(&mut self, timers: &mut TimerArena) {
        self.trigger_held = false;
        timers.cancel_where(self.actor, |purpose| {
            matches!(
                purpose,
                TimerPurpose::Cadence | TimerPurpose::Reload(_) | TimerPurpose::Cooldown(_)
            )
        });
        for state in &mut self.slots {
            state.is_reloading = false;
        }
    }

    fn begin_reload(&mut self, slot: WeaponSlot, timers: &mut TimerArena) -> bool {
        let state = &mut self.slots[slot.index()];
        if state.is_reloading {
            return false;
        }
        state.is_reloading = true;
        timers.schedule(
            self.key(TimerPurpose::Reload(slot)),
            self.config.weapon(slot).reload_duration(),
        );
        debug!(actor = %self.actor, ?slot, "Reload started");
        true
    }

    fn key(&self, purpose: TimerPurpose) -> TimerKey {
        TimerKey::new(self.actor, purpose)
    }
}
