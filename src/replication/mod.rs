//! Replication primitives: host-owned variables, ownership registry and the
//! request/broadcast channel shapes

pub mod channel;
pub mod registry;
pub mod var;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use channel::{Inbound, Outbox, Outgoing, Recipient};
pub use registry::{ActorRegistry, Role};
pub use var::{Change, Replicated};

/// Network identity of an actor, allocated by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}

/// Identity of a connection to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// The host's own connection when it also controls a player
    pub const HOST: ConnectionId = ConnectionId(Uuid::nil());

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::HOST {
            f.write_str("host")
        } else {
            write!(f, "{}", &self.0.to_string()[..8])
        }
    }
}
