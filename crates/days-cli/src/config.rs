use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Data file used when neither the CLI nor the config file names one.
pub const DEFAULT_DATA_FILE: &str = "days.data";

/// Redraw interval of the TUI when not configured.
pub const DEFAULT_TICK_MS: u64 = 250;

const MIN_TICK_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            tick_ms: default_tick_ms(),
            output: None,
        }
    }
}

/// Settings after applying CLI overrides on top of the user config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub data_file: PathBuf,
    pub tick: Duration,
    pub output: Option<String>,
}

/// Location of the user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("days/config.toml"))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(path) = user_config_path() else {
        return Ok(UserConfig::default());
    };
    load_config_file(&path)
}

pub fn load_config_file(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(user: UserConfig, file_flag: Option<PathBuf>) -> EffectiveConfig {
    EffectiveConfig {
        data_file: file_flag.unwrap_or(user.data_file),
        tick: Duration::from_millis(user.tick_ms.max(MIN_TICK_MS)),
        output: user.output,
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

const fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}
