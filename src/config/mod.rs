//! # Configuration Management Module
//!
//! Server, world and game-rule settings, loaded from a TOML file.
//!
//! ## Configuration Structure
//!
//! - [`ServerConfig`] - listener address, banner name, styling, line limits
//! - [`WorldConfig`] - world document location, tick period, degraded-start policy
//! - [`GameConfig`] - hit points, combat window, escape odds, damage policy
//! - [`LoggingConfig`] - log level and optional log file
//!
//! Every section carries serde defaults, so a partial file only needs the keys
//! it wants to change.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rpgchat::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Listening on port {}", config.server.port);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0"
//! port = 8888
//! name = "RPG"
//! colors = true
//!
//! [world]
//! path = "data/world.json"
//! tick_interval_ms = 200
//! require_world = false
//!
//! [game]
//! player_hp = 50
//! action_interval_ms = 2500
//! escape_chance = 0.3
//! clamp_damage = false
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

use crate::game::types::Weapon;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Shown in the connect banner: "Welcome to the <name> chat server".
    pub name: String,
    /// Emit SGR color sequences. Plain text when false.
    pub colors: bool,
    /// Longest accepted input line in bytes; longer input drops the connection.
    pub max_line_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8888,
            name: "RPG".to_string(),
            colors: true,
            max_line_len: 1024,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub path: String,
    pub tick_interval_ms: u64,
    /// Overrides the start cell named in the world document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cell: Option<u32>,
    /// When false a world that fails to load is logged and the server runs
    /// without a game; when true startup fails instead.
    pub require_world: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            path: "data/world.json".to_string(),
            tick_interval_ms: 200,
            start_cell: None,
            require_world: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_hp: i32,
    /// Accumulated time before an attack or escape attempt resolves.
    pub action_interval_ms: u64,
    /// Probability that a single escape attempt succeeds.
    pub escape_chance: f64,
    /// Clamp computed damage at zero instead of letting it heal the target.
    pub clamp_damage: bool,
    /// Fixed seed for escape rolls; entropy-seeded when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_weapon: Option<Weapon>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_hp: 50,
            action_interval_ms: 2500,
            escape_chance: 0.3,
            clamp_damage: false,
            rng_seed: None,
            starting_weapon: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        Self::from_toml(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Create a default configuration file
    pub async fn create_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path.display(), e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.tick_interval_ms == 0 {
            return Err(anyhow!("world.tick_interval_ms must be greater than zero"));
        }
        if !(0.0..=1.0).contains(&self.game.escape_chance) {
            return Err(anyhow!(
                "game.escape_chance must be between 0 and 1 (got {})",
                self.game.escape_chance
            ));
        }
        if self.server.max_line_len == 0 {
            return Err(anyhow!("server.max_line_len must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol() {
        let config = Config::default();
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.world.tick_interval_ms, 200);
        assert_eq!(config.game.player_hp, 50);
        assert_eq!(config.game.action_interval_ms, 2500);
        assert!(!config.world.require_world);
        assert!(!config.game.clamp_damage);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [game]
            clamp_damage = true
            starting_weapon = { name = "knife", damage = 4 }
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.name, "RPG");
        assert!(config.game.clamp_damage);
        assert_eq!(config.game.escape_chance, 0.3);
        let weapon = config.game.starting_weapon.unwrap();
        assert_eq!(weapon.name, "knife");
        assert_eq!(weapon.damage, 4);
    }

    #[test]
    fn rejects_impossible_escape_chance() {
        let err = Config::from_toml("[game]\nescape_chance = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("escape_chance"));
    }

    #[test]
    fn default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = Config::from_toml(&text).unwrap();
        assert_eq!(parsed.server.listen_addr(), "0.0.0.0:8888");
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config.server.port, 8888);
    }

    #[test]
    fn level_filter_parses_names() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
        logging.level = "debug".into();
        assert_eq!(logging.level_filter(), log::LevelFilter::Debug);
        logging.level = "nonsense".into();
        assert_eq!(logging.level_filter(), log::LevelFilter::Info);
    }
}
