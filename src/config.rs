//! Launch configuration for blackout.
//!
//! * Looks for `blackout.toml` in the cwd unless overridden by `--config`.
//! * Every key is optional, so the file is too.
//!
//! Player progress does not live here; see [`crate::io`] for the settings file.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::default_settings_path;
use crate::settings::GamePreset;

pub const DEFAULT_CONFIG_FILE: &str = "blackout.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Settings file; the per-user data directory when unset.
    pub settings_path:   Option<PathBuf>,
    /// Preset used when the settings file is unreadable.
    pub fallback_preset: String,
    pub window_width:    f32,
    pub window_height:   f32,
    /// Numpad phase override. Only compiled into debug builds.
    pub debug_keys:      bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_path:   None,
            fallback_preset: GamePreset::DEFAULT.name.to_string(),
            window_width:    1200.0,
            window_height:   800.0,
            debug_keys:      true,
        }
    }
}

impl Config {
    /// Load from a TOML file; fall back to defaults on any error.
    pub fn load(path: Option<&Path>) -> Self {
        Self::try_load(path).unwrap_or_else(|err| {
            log::warn!("{err}; using default config");
            Self::default()
        })
    }

    /// Like [`Config::load`] but a malformed file is an error. A missing
    /// file still yields defaults.
    pub fn try_load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let p = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let text = match fs::read_to_string(p) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: p.to_path_buf(), source }),
        };
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: p.to_path_buf(), source })
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings_path.clone().unwrap_or_else(default_settings_path)
    }

    pub fn fallback_preset(&self) -> Result<GamePreset, ConfigError> {
        GamePreset::by_name(&self.fallback_preset)
            .ok_or_else(|| ConfigError::UnknownPreset(self.fallback_preset.clone()))
    }
}
