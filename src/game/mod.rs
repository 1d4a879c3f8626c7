//! Combat simulation modules

pub mod combat;
pub mod lifecycle;
pub mod participant;
pub mod presentation;
pub mod recoil;
pub mod session;
pub mod spatial;
pub mod timers;
pub mod weapon;

pub use combat::CombatSystem;
pub use lifecycle::{LifeState, PlayerLifecycle, Presence};
pub use participant::{ActorState, Participant};
pub use presentation::PresentationEvent;
pub use recoil::{Aim, Recoil};
pub use session::{HostSession, Outbound, SessionHandle, SessionInput, SessionStats};
pub use spatial::{EmptyScene, HitTag, LayerMask, RayHit, SpatialQuery};
pub use timers::{TimerArena, TimerKey, TimerPurpose};
pub use weapon::{Loadout, Shot, TriggerOutcome, WeaponPhase, WeaponState};
