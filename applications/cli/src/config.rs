/// CLI configuration
use crate::error::{CliError, Result};
use muply_playback::persistence::StorageKeys;
use muply_playback::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "muply.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// JSON file backing the key-value store
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Player behaviour
    #[serde(default)]
    pub player: PlayerConfig,

    /// Storage key names
    #[serde(default)]
    pub storage: StorageKeys,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `muply.toml` is read when
    /// present. `MUPLY_*` variables override both, with `__` between nested
    /// keys (`MUPLY_PLAYER__VOLUME=0.5`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with MUPLY_)
        settings = settings.add_source(
            config::Environment::with_prefix("MUPLY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.volume) {
            return Err(CliError::Config(format!(
                "player.volume must be within 0.0-1.0, got {}",
                self.player.volume
            )));
        }

        let stages = muply_audio::DEFAULT_STAGE_FREQUENCIES.len();
        if self.player.stage_gains.len() > stages {
            return Err(CliError::Config(format!(
                "player.stage_gains has {} entries, the equalizer has {} stages",
                self.player.stage_gains.len(),
                stages
            )));
        }

        if self.storage.playlist == self.storage.index {
            return Err(CliError::Config(
                "storage.playlist and storage.index must differ".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".muply/state.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            player: PlayerConfig::default(),
            storage: StorageKeys::default(),
        }
    }
}
