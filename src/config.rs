use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::aim::{AimSettings, DEFAULT_MARGIN, DEFAULT_ROUND_SECS, DEFAULT_TARGET_SIZE};
use crate::arcade::GameKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub seed: Option<u64>,
    pub sound: bool,
    pub aim_round_secs: u32,
    pub aim_target_size: f64,
    pub aim_margin: f64,
    pub start_tab: GameKind,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            sound: true,
            aim_round_secs: DEFAULT_ROUND_SECS,
            aim_target_size: DEFAULT_TARGET_SIZE,
            aim_margin: DEFAULT_MARGIN,
            start_tab: GameKind::Reaction,
            log_file: None,
        }
    }
}

/// Non-finite values fall back to the default, finite ones are clamped
fn finite_or(value: f64, default: f64, min: f64) -> f64 {
    if value.is_finite() {
        value.max(min)
    } else {
        default
    }
}

impl Config {
    pub fn aim_settings(&self) -> AimSettings {
        AimSettings {
            round_secs: self.aim_round_secs.max(1),
            target_size: finite_or(self.aim_target_size, DEFAULT_TARGET_SIZE, 1.0),
            margin: finite_or(self.aim_margin, DEFAULT_MARGIN, 0.0),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "noorpath") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("noorpath_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or malformed files fall back to defaults
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(err) => {
                    log::warn!("ignoring malformed config {}: {err}", self.path.display());
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
