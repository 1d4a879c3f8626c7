//! Actor ownership registry keyed by network identity

use std::collections::HashMap;

use crate::error::CombatError;

use super::{ActorId, ConnectionId};

/// Which side of the topology this process is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Client,
}

/// Maps actors to their owning connection.
///
/// Gating in the combat core is expressed through `is_host`, `is_local` and
/// `is_owner` only.
#[derive(Debug)]
pub struct ActorRegistry {
    role: Role,
    local_connection: Option<ConnectionId>,
    owners: HashMap<ActorId, ConnectionId>,
    by_connection: HashMap<ConnectionId, ActorId>,
    next_actor_id: u64,
}

impl ActorRegistry {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            local_connection: None,
            owners: HashMap::new(),
            by_connection: HashMap::new(),
            next_actor_id: 1,
        }
    }

    pub fn is_host(&self) -> bool {
        self.role == Role::Host
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Fails with `NotAuthorized` unless this process is the host
    pub fn require_host(&self, op: &str) -> Result<(), CombatError> {
        if self.is_host() {
            Ok(())
        } else {
            Err(CombatError::not_authorized(op))
        }
    }

    /// Connection controlled by this process, once known
    pub fn local_connection(&self) -> Option<ConnectionId> {
        self.local_connection
    }

    pub fn set_local_connection(&mut self, connection: ConnectionId) {
        self.local_connection = Some(connection);
    }

    /// True only for the actor controlled by this participant's connection
    pub fn is_local(&self, actor: ActorId) -> bool {
        match (self.local_connection, self.owners.get(&actor)) {
            (Some(local), Some(owner)) => local == *owner,
            _ => false,
        }
    }

    pub fn is_owner(&self, actor: ActorId, connection: ConnectionId) -> bool {
        self.owners.get(&actor) == Some(&connection)
    }

    pub fn owner(&self, actor: ActorId) -> Option<ConnectionId> {
        self.owners.get(&actor).copied()
    }

    pub fn actor_of(&self, connection: ConnectionId) -> Option<ActorId> {
        self.by_connection.get(&connection).copied()
    }

    /// The actor this participant controls, if spawned
    pub fn local_actor(&self) -> Option<ActorId> {
        self.local_connection.and_then(|c| self.actor_of(c))
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.owners.contains_key(&actor)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.owners.keys().copied()
    }

    /// Hand out a fresh actor id. Host only.
    pub fn allocate(&mut self) -> Result<ActorId, CombatError> {
        self.require_host("allocate actor id")?;
        let id = ActorId(self.next_actor_id);
        self.next_actor_id += 1;
        Ok(id)
    }

    /// Record ownership. Re-registering an actor under another owner is refused.
    pub fn register(&mut self, actor: ActorId, owner: ConnectionId) -> Result<(), CombatError> {
        match self.owners.get(&actor) {
            Some(existing) if *existing != owner => {
                return Err(CombatError::InvalidTransition("actor ownership is immutable"))
            }
            Some(_) => return Ok(()),
            None => {}
        }
        if self.by_connection.contains_key(&owner) {
            return Err(CombatError::InvalidTransition(
                "connection already owns an actor",
            ));
        }
        self.owners.insert(actor, owner);
        self.by_connection.insert(owner, actor);
        Ok(())
    }

    pub fn remove(&mut self, actor: ActorId) -> Option<ConnectionId> {
        let owner = self.owners.remove(&actor)?;
        self.by_connection.remove(&owner);
        Some(owner)
    }
}
