//! Hit-test collaborator interface
//!
//! Physics stepping is owned elsewhere; the combat core only asks for the first
//! thing along a ray.

use glam::Vec3;

use crate::replication::ActorId;

/// Collision layers a ray can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(&self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// How the struck object is tagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTag {
    Player,
    Other,
}

/// First solid surface or actor along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Networked actor owning the struck collider, if any
    pub actor: Option<ActorId>,
    pub tag: HitTag,
}

impl RayHit {
    /// The struck actor, if it is tagged as a player
    pub fn player(&self) -> Option<ActorId> {
        match self.tag {
            HitTag::Player => self.actor,
            HitTag::Other => None,
        }
    }
}

pub trait SpatialQuery: Send + Sync {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;
}

/// A scene with nothing in it. Used by a dedicated host, which never shoots.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScene;

impl SpatialQuery for EmptyScene {
    fn raycast(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
        None
    }
}
