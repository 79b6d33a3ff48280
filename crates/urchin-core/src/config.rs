//! Configuration system for Urchin clients.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $URCHIN_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/urchin/config.toml
//!   3. ~/.config/urchin/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrchinConfig {
    pub connection: ConnectionConfig,
    pub viewer: ViewerConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    pub transfer: TransferConfig,
    pub objects: ObjectsConfig,
    pub atlas: AtlasConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Use the local relay instead of the hosted one.
    pub localhost: bool,
    pub production_url: String,
    pub local_url: String,
    /// Budget for the WebSocket + Socket.IO handshake.
    pub handshake_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Renderer runs as a desktop app; don't open the web viewer.
    pub standalone: bool,
    /// Session id is appended to this.
    pub url: String,
    pub launch: ViewerLaunch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerLaunch {
    /// Open the OS default browser.
    Browser,
    /// Only log the viewer URL (headless or hosted environments).
    Log,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed session id. Empty = random per client.
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Forward renderer info and warning lines. Errors are always forwarded.
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Max bytes per outbound chunk.
    pub chunk_bytes: usize,
    /// Largest screenshot or texture side, in pixels.
    pub max_image_dimension: u32,
    pub screenshot_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectsConfig {
    pub repeat_delete: RepeatDelete,
}

/// What `delete()` does on an object that is already deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatDelete {
    /// Emit the deletion event again.
    #[default]
    Reemit,
    /// Warn and emit nothing.
    Skip,
    /// Fail with a stale-object error.
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    /// Directory holding `<atlas>.structures.json` ontology files.
    pub data_dir: PathBuf,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const PRODUCTION_URL: &str = "https://urchin-commserver.herokuapp.com/";
pub const LOCAL_URL: &str = "http://localhost:5000";
pub const VIEWER_URL: &str = "https://data.virtualbrainlab.org/Urchin/?ID=";

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            localhost: false,
            production_url: PRODUCTION_URL.to_string(),
            local_url: LOCAL_URL.to_string(),
            handshake_timeout_secs: 10,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            standalone: false,
            url: VIEWER_URL.to_string(),
            launch: ViewerLaunch::Browser,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { verbose: true }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: 1_000_000,
            max_image_dimension: 15_000,
            screenshot_timeout_secs: 30,
        }
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            data_dir: data_dir().join("atlases"),
        }
    }
}

impl ConnectionConfig {
    /// The relay URL this config selects.
    pub fn endpoint(&self) -> &str {
        if self.localhost {
            &self.local_url
        } else {
            &self.production_url
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("urchin")
}

fn data_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".local").join("share"))
        .join("urchin")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl UrchinConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            UrchinConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("URCHIN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&UrchinConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply URCHIN_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let flag = |v: String| v == "true" || v == "1";
        if let Some(v) = var("URCHIN_CONNECTION__LOCALHOST") {
            self.connection.localhost = flag(v);
        }
        if let Some(v) = var("URCHIN_VIEWER__STANDALONE") {
            self.viewer.standalone = flag(v);
        }
        if let Some(v) = var("URCHIN_VIEWER__LAUNCH") {
            match v.as_str() {
                "browser" => self.viewer.launch = ViewerLaunch::Browser,
                "log" => self.viewer.launch = ViewerLaunch::Log,
                _ => {}
            }
        }
        if let Some(v) = var("URCHIN_SESSION__ID") {
            self.session.id = v;
        }
        if let Some(v) = var("URCHIN_LOGGING__VERBOSE") {
            self.logging.verbose = flag(v);
        }
        if let Some(v) = var("URCHIN_ATLAS__DATA_DIR") {
            self.atlas.data_dir = PathBuf::from(v);
        }
    }
}
