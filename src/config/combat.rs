//! Weapon and player tunables
//!
//! Static inputs to the combat core, loaded once at startup and shared by `Arc`.

use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ws::protocol::WeaponSlot;

use super::ConfigError;

/// Longest accepted cooldown, reload or respawn delay (seconds)
pub const MAX_TIMING_SECS: f64 = 3600.0;

/// Fastest accepted automatic fire rate (shots per second)
pub const MAX_SHOOT_RATE: f32 = 1000.0;

/// Convert a configured delay, rejecting values no timer can hold
fn timing(what: &str, secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || !(0.0..=MAX_TIMING_SECS).contains(&secs) {
        return Err(ConfigError::Invalid(format!(
            "{what} must be between 0 and {MAX_TIMING_SECS} seconds, got {secs}"
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::Invalid(format!("{what}: {e}")))
}

/// Delay accessor for a config that has passed validation.
/// Out-of-range values are clamped and NaN reads as zero.
fn bounded(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_TIMING_SECS)).unwrap_or_default()
}

/// Weapon stats per slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub name: String,
    /// Damage per hit
    pub damage: u32,
    /// Maximum hit-test distance
    pub range: f32,
    /// Shots per second while the trigger is held, 0 for single-shot weapons
    pub shoot_rate: f32,
    /// Cooldown after a single shot (seconds)
    pub shoot_cooldown: f32,
    /// Recoil added to the shooter's aim per shot
    pub recoil_force: f32,
    /// Magazine capacity
    pub magazine_capacity: u32,
    /// Reload duration (seconds)
    pub reload_time: f32,
    /// Presentation asset instantiated on equip
    #[serde(default)]
    pub graphics: Option<String>,
    /// Shot audio asset
    #[serde(default)]
    pub audio: Option<String>,
}

impl WeaponConfig {
    /// Rifle used as the default primary
    pub fn rifle() -> Self {
        Self {
            name: "M4".to_string(),
            damage: 10,
            range: 100.0,
            shoot_rate: 10.0,
            shoot_cooldown: 0.25,
            recoil_force: 2.0,
            magazine_capacity: 30,
            reload_time: 1.5,
            graphics: Some("weapons/m4".to_string()),
            audio: Some("audio/m4_shot".to_string()),
        }
    }

    /// Sidearm used as the default secondary
    pub fn pistol() -> Self {
        Self {
            name: "Pistol".to_string(),
            damage: 20,
            range: 60.0,
            shoot_rate: 0.0,
            shoot_cooldown: 0.25,
            recoil_force: 3.0,
            magazine_capacity: 12,
            reload_time: 1.0,
            graphics: Some("weapons/pistol".to_string()),
            audio: Some("audio/pistol_shot".to_string()),
        }
    }

    pub fn is_automatic(&self) -> bool {
        self.shoot_rate > 0.0
    }

    /// Time between cadence ticks, `None` for single-shot weapons
    pub fn cadence_period(&self) -> Option<Duration> {
        self.is_automatic()
            .then(|| bounded(1.0 / self.shoot_rate as f64))
    }

    pub fn cooldown(&self) -> Duration {
        bounded(self.shoot_cooldown as f64)
    }

    pub fn reload_duration(&self) -> Duration {
        bounded(self.reload_time as f64)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |what: &str| ConfigError::Invalid(format!("weapon {}: {what}", self.name));
        if self.magazine_capacity == 0 {
            return Err(invalid("magazine_capacity must be positive"));
        }
        if self.damage == 0 {
            return Err(invalid("damage must be positive"));
        }
        if !(self.range > 0.0) {
            return Err(invalid("range must be positive"));
        }
        if !(0.0..=MAX_SHOOT_RATE).contains(&self.shoot_rate) {
            return Err(invalid("shoot_rate out of range"));
        }
        if self.is_automatic() {
            timing(&format!("weapon {} cadence", self.name), 1.0 / self.shoot_rate as f64)?;
        }
        timing(&format!("weapon {} shoot_cooldown", self.name), self.shoot_cooldown as f64)?;
        timing(&format!("weapon {} reload_time", self.name), self.reload_time as f64)?;
        if !(self.recoil_force >= 0.0) {
            return Err(invalid("recoil_force must be >= 0"));
        }
        Ok(())
    }
}

/// Per-player lifecycle tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub max_health: u32,
    /// Delay between death and respawn (seconds)
    pub respawn_delay: f32,
    /// Candidate respawn positions
    pub spawn_points: Vec<Vec3>,
}

impl PlayerConfig {
    pub fn respawn_duration(&self) -> Duration {
        bounded(self.respawn_delay as f64)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            respawn_delay: 3.0,
            // Players drop back in from above the arena
            spawn_points: vec![Vec3::new(0.0, 10.0, 0.0)],
        }
    }
}

/// All combat tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConfig {
    pub player: PlayerConfig,
    pub primary: WeaponConfig,
    pub secondary: WeaponConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            primary: WeaponConfig::rifle(),
            secondary: WeaponConfig::pistol(),
        }
    }
}

impl CombatConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn weapon(&self, slot: WeaponSlot) -> &WeaponConfig {
        match slot {
            WeaponSlot::Primary => &self.primary,
            WeaponSlot::Secondary => &self.secondary,
        }
    }

    /// Upper bound for a single damage request
    pub fn max_weapon_damage(&self) -> u32 {
        self.primary.damage.max(self.secondary.damage)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.player.max_health == 0 {
            return Err(ConfigError::Invalid("max_health must be positive".into()));
        }
        timing("respawn_delay", self.player.respawn_delay as f64)?;
        if self.player.spawn_points.is_empty() {
            return Err(ConfigError::Invalid("at least one spawn point is required".into()));
        }
        self.primary.validate()?;
        self.secondary.validate()
    }
}
