//! Configuration module - environment variable parsing

pub mod combat;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub use combat::{CombatConfig, PlayerConfig, WeaponConfig};

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, empty means any
    pub client_origins: Vec<String>,
    /// Seed for the session RNG (spawn selection, recoil jitter)
    pub session_seed: u64,
    /// Weapon and player tunables
    pub combat: CombatConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // PORT wins over SERVER_ADDR so hosted deployments can inject it
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let client_origins = env::var("CLIENT_ORIGIN")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let session_seed = match env::var("SESSION_SEED") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("SESSION_SEED: {raw}")))?,
            Err(_) => rand::random(),
        };

        let combat = match env::var("COMBAT_CONFIG") {
            Ok(path) => CombatConfig::from_file(PathBuf::from(path))?,
            Err(_) => CombatConfig::default(),
        };
        combat.validate()?;

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origins,
            session_seed,
            combat,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read combat config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse combat config: {0}")]
    Parse(#[from] serde_json::Error),
}
