//! Player lifecycle: health, death and revival

use tracing::warn;

use crate::error::CombatError;
use crate::replication::{Change, Replicated};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive,
    Dead,
}

/// Local enable flags for an actor's input handling and colliders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub input_enabled: bool,
    pub colliders_enabled: bool,
}

impl Default for Presence {
    fn default() -> Self {
        Self {
            input_enabled: true,
            colliders_enabled: true,
        }
    }
}

/// Transitions produced by one host-side lifecycle operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LifecycleChanges {
    pub health: Option<Change<u32>>,
    pub is_dead: Option<Change<bool>>,
}

/// Health and death state of one actor.
///
/// `health` and `is_dead` are independent replicated variables. A mirror may
/// observe `health == 0` while `is_dead` is still false for a moment; that is
/// an expected transient.
#[derive(Debug)]
pub struct PlayerLifecycle {
    pub health: Replicated<u32>,
    pub is_dead: Replicated<bool>,
    max_health: u32,
    presence: Presence,
}

impl PlayerLifecycle {
    /// Host copy, spawned alive at full health
    pub fn authoritative(max_health: u32) -> Self {
        Self {
            health: Replicated::authoritative(max_health),
            is_dead: Replicated::authoritative(false),
            max_health,
            presence: Presence::default(),
        }
    }

    /// Client copy built from a snapshot
    pub fn mirror(
        max_health: u32,
        health: (u64, u32),
        is_dead: (u64, bool),
    ) -> Self {
        let mut lifecycle = Self {
            health: Replicated::mirror(health.1, health.0),
            is_dead: Replicated::mirror(is_dead.1, is_dead.0),
            max_health,
            presence: Presence::default(),
        };
        if is_dead.1 {
            lifecycle.disable();
        }
        lifecycle
    }

    pub fn state(&self) -> LifeState {
        if *self.is_dead.get() {
            LifeState::Dead
        } else {
            LifeState::Alive
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state() == LifeState::Alive
    }

    pub fn health(&self) -> u32 {
        *self.health.get()
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Apply damage. Host only, actor must be alive.
    pub fn take_damage(&mut self, amount: u32) -> Result<LifecycleChanges, CombatError> {
        if !self.health.is_authoritative() {
            warn!(amount, "take_damage invoked on a non-host participant");
            return Err(CombatError::not_authorized("take_damage"));
        }
        if !self.is_alive() {
            return Err(CombatError::InvalidTransition("damage applied to a dead actor"));
        }

        let remaining = self.health().saturating_sub(amount);
        let mut changes = LifecycleChanges {
            health: self.health.set(remaining)?,
            is_dead: None,
        };
        if remaining == 0 {
            changes.is_dead = self.is_dead.set(true)?;
        }
        Ok(changes)
    }

    /// Restore full health and clear the death flag. Host only.
    pub fn revive(&mut self) -> Result<LifecycleChanges, CombatError> {
        if !self.is_dead.is_authoritative() {
            return Err(CombatError::not_authorized("revive"));
        }
        if self.is_alive() {
            return Err(CombatError::InvalidTransition("revive on a living actor"));
        }
        Ok(LifecycleChanges {
            health: self.health.set(self.max_health)?,
            is_dead: self.is_dead.set(false)?,
        })
    }

    /// Suppress input and colliders. Idempotent.
    pub fn disable(&mut self) {
        self.presence = Presence {
            input_enabled: false,
            colliders_enabled: false,
        };
    }

    pub fn enable(&mut self) {
        self.presence = Presence::default();
    }
}
