//! Server configuration.
//!
//! Consolidates CLI overrides and environment variable reads, with
//! validation before anything binds or spawns.

use std::net::SocketAddr;
use std::path::PathBuf;

use holdem::game::GameConfig;
use holdem::table::TableConfig;

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    pub bind: SocketAddr,
    /// Directory of static frontend files served at `/`.
    pub frontend_dir: PathBuf,
    /// Table settings handed to the table actor.
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration. CLI overrides win over environment
    /// variables, which win over defaults.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        frontend_override: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:8080"
                    .parse()
                    .expect("default bind address is valid")
            });

        let frontend_dir = frontend_override
            .or_else(|| std::env::var("FRONTEND_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("../frontend"));

        let defaults = GameConfig::default();
        let game = GameConfig {
            starting_chips: parse_env_or("STARTING_CHIPS", defaults.starting_chips),
            small_blind: parse_env_or("TABLE_SMALL_BLIND", defaults.small_blind),
            big_blind: parse_env_or("TABLE_BIG_BLIND", defaults.big_blind),
        };

        let table = TableConfig {
            game,
            ..TableConfig::default()
        };

        Ok(Self {
            bind,
            frontend_dir,
            table,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.table.game;
        if game.small_blind == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_SMALL_BLIND".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if game.big_blind <= game.small_blind {
            return Err(ConfigError::Invalid {
                var: "TABLE_BIG_BLIND".to_string(),
                reason: format!("must be greater than small blind ({})", game.small_blind),
            });
        }
        if game.starting_chips < game.big_blind {
            return Err(ConfigError::Invalid {
                var: "STARTING_CHIPS".to_string(),
                reason: format!("must cover at least the big blind ({})", game.big_blind),
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
