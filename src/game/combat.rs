//! Combat authority - shot resolution on the shooter, request validation on the host

use glam::Vec3;

use crate::error::CombatError;
use crate::replication::{ActorId, ActorRegistry, ConnectionId};
use crate::ws::protocol::{CombatEffect, ImpactMaterial, RequestCall};

use super::spatial::{LayerMask, SpatialQuery};
use super::weapon::Shot;

/// Combat rules shared by the shooter and the host
pub struct CombatSystem;

impl CombatSystem {
    /// Turn one round into the requests the shooter sends to the host.
    ///
    /// The muzzle flash goes first, then damage and impact for whatever the
    /// ray struck. A miss produces no impact.
    pub fn resolve_shot(
        spatial: &dyn SpatialQuery,
        origin: Vec3,
        direction: Vec3,
        shot: &Shot,
        mask: LayerMask,
    ) -> Vec<RequestCall> {
        let mut calls = vec![RequestCall::Shot {
            recoil: shot.recoil,
        }];

        let Some(hit) = spatial.raycast(origin, direction, shot.range, mask) else {
            return calls;
        };

        let material = match hit.player() {
            Some(target) => {
                calls.push(RequestCall::Damage {
                    target,
                    amount: shot.damage,
                });
                ImpactMaterial::Metal
            }
            None => ImpactMaterial::Stone,
        };
        calls.push(RequestCall::Impact {
            material,
            point: hit.point,
            normal: hit.normal,
        });
        calls
    }

    /// A connection may only invoke calls on the actor it owns
    pub fn authorize(
        registry: &ActorRegistry,
        connection: ConnectionId,
        actor: ActorId,
    ) -> Result<(), CombatError> {
        registry.require_host("handle request")?;
        if !registry.contains(actor) {
            return Err(CombatError::TargetMissing(actor));
        }
        if !registry.is_owner(actor, connection) {
            return Err(CombatError::not_authorized(format!(
                "{connection} does not own {actor}"
            )));
        }
        Ok(())
    }

    /// Damage must be positive and no larger than any configured weapon deals
    pub fn validate_damage(
        connection: ConnectionId,
        amount: u32,
        max_damage: u32,
    ) -> Result<u32, CombatError> {
        if amount == 0 || amount > max_damage {
            return Err(CombatError::InvalidDamage { amount, connection });
        }
        Ok(amount)
    }

    /// Broadcast payload for an effect request made by `shooter`
    pub fn effect_for(shooter: ActorId, call: &RequestCall) -> Option<CombatEffect> {
        match *call {
            RequestCall::Impact {
                material,
                point,
                normal,
            } => Some(CombatEffect::Impact {
                shooter,
                material,
                point,
                normal: normal.normalize_or_zero(),
            }),
            RequestCall::Shot { recoil } if recoil.is_finite() => Some(CombatEffect::MuzzleFlash {
                shooter,
                recoil: recoil.max(0.0),
            }),
            _ => None,
        }
    }
}
