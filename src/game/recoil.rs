//! Decaying recoil accumulator and the aim it perturbs

use glam::Vec3;
use rand::Rng;

/// Vertical look limit in degrees
pub const PITCH_LIMIT_DEG: f32 = 85.0;
/// Horizontal jitter range as a multiple of the current recoil
const YAW_JITTER: f32 = 1.2;

/// View direction of the local player, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aim {
    pub yaw: f32,
    pub pitch: f32,
}

impl Aim {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
        }
    }

    /// Unit vector the weapon points along. Yaw 0 looks down +Z.
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos())
    }
}

/// Accumulated recoil. Grows per shot, halves every rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Recoil {
    force: f32,
}

impl Recoil {
    pub fn add(&mut self, force: f32) {
        self.force += force.max(0.0);
    }

    pub fn force(&self) -> f32 {
        self.force
    }

    /// Perturb `aim` by the current recoil, then halve it
    pub fn apply<R: Rng>(&mut self, aim: &mut Aim, rng: &mut R) {
        if self.force > 0.0 {
            let spread = YAW_JITTER * self.force;
            aim.yaw += rng.gen_range(-spread..=spread);
            aim.pitch = (aim.pitch + self.force).clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        }
        self.force *= 0.5;
    }
}
