//! Utilities

pub mod rate_limit;
pub mod time;
