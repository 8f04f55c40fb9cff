//! Per-user settings, read from `settings.json` in the user config directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConfigError;
use crate::consts::TELEMETRY_URL_ENV;
use crate::platform::paths::settings_path;

/// Settings shared by every build on this machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  /// Endpoint receiving build telemetry. Unset disables telemetry.
  pub telemetry_url: Option<String>,
  /// Android SDK location used when a command does not name one.
  pub android_sdk: Option<PathBuf>,
}

impl Settings {
  /// Load settings from `path`. A missing file yields the defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      debug!(path = %path.display(), "no settings file, using defaults");
      return Ok(Self::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Load settings from the default per-user location.
  pub fn load_default() -> Result<Self, ConfigError> {
    match settings_path() {
      Some(path) => Self::load(&path),
      None => Ok(Self::default()),
    }
  }

  /// The telemetry endpoint, with the environment taking precedence over the file.
  pub fn telemetry_url(&self) -> Option<String> {
    std::env::var(TELEMETRY_URL_ENV)
      .ok()
      .filter(|url| !url.is_empty())
      .or_else(|| self.telemetry_url.clone())
  }
}
