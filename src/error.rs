//! Error taxonomy for the combat core
//!
//! None of these cross the network boundary. Requests are fire-and-forget, so the
//! host logs the error and drops the call; the sender simply observes nothing.

use crate::replication::{ActorId, ConnectionId};
use crate::ws::protocol::WeaponSlot;

/// Errors raised by the replication and combat layers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombatError {
    /// A host-only mutation was attempted somewhere other than the host,
    /// or a connection invoked a call on an actor it does not own
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The actor named by a request or broadcast no longer exists
    #[error("actor {0} not found")]
    TargetMissing(ActorId),

    /// The state machine is not in a state that accepts this transition
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    /// Damage amount outside of what any configured weapon can deal
    #[error("invalid damage amount {amount} from {connection}")]
    InvalidDamage { amount: u32, connection: ConnectionId },

    /// Weapon presentation could not be set up, equip aborted
    #[error("cannot equip {slot:?} ({weapon}): {reason}")]
    EquipFailed {
        slot: WeaponSlot,
        weapon: String,
        reason: &'static str,
    },
}

impl CombatError {
    pub fn not_authorized(op: impl Into<String>) -> Self {
        Self::NotAuthorized(op.into())
    }
}
