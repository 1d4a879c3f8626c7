//! Arena combat server
//!
//! Host-authoritative combat replication for a multiplayer shooter: replicated
//! variables, request/broadcast invocation, actor ownership, player lifecycle
//! and weapon state machines, served over WebSocket.

pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod http;
pub mod replication;
pub mod util;
pub mod ws;
