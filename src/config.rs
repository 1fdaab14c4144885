use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::core::definitions::{AiMode, GameMode};
use crate::core::engine::{Token, MAX_SIZE, MIN_SIZE};

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    #[serde_as(as = "DisplayFromStr")]
    pub starting_color: Token,
    pub search_depth: u32,
    pub mode: GameMode,
    pub ai_mode: AiMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: 8,
            cols: 9,
            starting_color: Token::Red,
            search_depth: 4,
            mode: GameMode::HotSeat,
            ai_mode: AiMode::Random,
        }
    }
}

impl GameConfig {
    /// Replaces out-of-range sizes by the defaults and clamps the search depth.
    pub fn sanitized(self) -> Self {
        let default = GameConfig::default();
        let in_range = |size: usize| (MIN_SIZE..=MAX_SIZE).contains(&size);
        let rows = if in_range(self.rows) {
            self.rows
        } else {
            warn!("rows = {} is out of range, using {}", self.rows, default.rows);
            default.rows
        };
        let cols = if in_range(self.cols) {
            self.cols
        } else {
            warn!("cols = {} is out of range, using {}", self.cols, default.cols);
            default.cols
        };
        GameConfig {
            rows,
            cols,
            starting_color: self.starting_color,
            search_depth: clamp_depth(self.search_depth),
            mode: self.mode,
            ai_mode: self.ai_mode,
        }
    }
}

pub fn clamp_depth(depth: u32) -> u32 {
    depth.clamp(MIN_DEPTH, MAX_DEPTH)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(AppConfig {
            game: config.game.sanitized(),
            server: config.server,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Falls back to defaults when `path` doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!("Config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// `PORT` overrides the configured server port.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(err) => warn!("Ignoring PORT='{}': {}", port, err),
            }
        }
        self
    }
}
