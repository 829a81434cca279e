//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for recovery settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::replay::DecodeStreams;

const CONFIG_FILE: &str = "config.toml";

/// Recovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where and how bank files are written
    #[serde(default)]
    pub output: OutputConfig,
    /// Event streams to decode
    #[serde(default)]
    pub decode: DecodeConfig,
}

/// Bank file output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Export root directory (default: ".")
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Bank file extension (default: "SC2Bank")
    #[serde(default = "default_extension")]
    pub extension: String,
    /// XML indentation width (default: 2)
    #[serde(default = "default_indent")]
    pub indent: usize,
}

/// Event stream selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeConfig {
    #[serde(default = "default_true")]
    pub game: bool,
    #[serde(default = "default_true")]
    pub message: bool,
    #[serde(default = "default_true")]
    pub tracker: bool,
}

impl DecodeConfig {
    pub fn streams(&self) -> DecodeStreams {
        DecodeStreams::new(self.game, self.message, self.tracker)
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_extension() -> String {
    "SC2Bank".to_string()
}
fn default_indent() -> usize {
    2
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            extension: default_extension(),
            indent: default_indent(),
        }
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            game: default_true(),
            message: default_true(),
            tracker: default_true(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\sc2bankrecover\config`
/// On macOS: `~/Library/Application Support/com.nanitefactory.sc2bankrecover`
/// On Linux: `~/.config/sc2bankrecover`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "nanitefactory", "sc2bankrecover")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        return Config::default();
    };
    match load_from(&path) {
        Ok(config) => config,
        Err(ConfigError::Io(_)) => Config::default(),
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "Ignoring unreadable config");
            Config::default()
        }
    }
}

/// Loads the configuration at `path`, surfacing read and parse errors.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
pub fn save(config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = config_dir() {
        save_to(config, &dir.join(CONFIG_FILE))?;
    }
    Ok(())
}

/// Writes the configuration to `path`, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
