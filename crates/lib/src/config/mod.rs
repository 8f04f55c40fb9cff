//! The app configuration.
//!
//! A [`Configuration`] is the app manifest (`config.json`): an arbitrary
//! nested mapping holding the app name, uuid, icons, activations and
//! per-platform package names. Tasks read it through [`Configuration::get`]
//! and [`Configuration::render`], and may write derived values back into it
//! during a build.

mod path;
mod settings;
mod transform;

pub use path::{Segment, parse_path};
pub use settings::Settings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::platform::Platform;

/// Errors raised while loading or querying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("{} must contain a JSON object at the top level", path.display())]
  NotAMapping { path: PathBuf },

  #[error("configuration has no value at `{0}`")]
  MissingKey(String),

  #[error("configuration value at `{0}` is not a string, number or boolean")]
  NotScalar(String),

  #[error("invalid configuration path `{0}`")]
  InvalidPath(String),

  #[error("unterminated `${{` in template: {0}")]
  Unterminated(String),
}

/// The app manifest for one build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Value);

impl Default for Configuration {
  fn default() -> Self {
    Self(Value::Object(Map::new()))
  }
}

impl Configuration {
  pub fn new(value: Value) -> Self {
    Self(value)
  }

  /// Load a configuration from a JSON file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    if !value.is_object() {
      return Err(ConfigError::NotAMapping {
        path: path.to_path_buf(),
      });
    }
    Ok(Self(value))
  }

  pub fn as_value(&self) -> &Value {
    &self.0
  }

  pub fn into_value(self) -> Value {
    self.0
  }

  /// Look up a value by path, e.g. `name`, `icons["36"]` or `activations[0].scripts`.
  pub fn get(&self, path: &str) -> Option<&Value> {
    let segments = parse_path(path).ok()?;
    path::lookup(&self.0, &segments)
  }

  pub fn get_str(&self, path: &str) -> Option<&str> {
    self.get(path).and_then(Value::as_str)
  }

  /// The app name. Every real manifest has one.
  pub fn name(&self) -> Result<&str, ConfigError> {
    self.get_str("name").ok_or_else(|| ConfigError::MissingKey("name".to_string()))
  }

  pub fn uuid(&self) -> Option<&str> {
    self.get_str("uuid")
  }

  /// The app name reduced to lowercase ASCII alphanumerics, for file and package names.
  pub fn slug(&self) -> Result<String, ConfigError> {
    Ok(
      self
        .name()?
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect(),
    )
  }

  /// Set a value, creating intermediate mappings as needed.
  ///
  /// Non-mapping values in the way are replaced.
  pub fn set(&mut self, keys: &[&str], value: Value) {
    let Some((last, parents)) = keys.split_last() else {
      self.0 = value;
      return;
    };
    let mut current = &mut self.0;
    for key in parents {
      current = ensure_object(current)
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(last.to_string(), value);
  }

  pub fn package_name(&self, platform: Platform) -> Option<&str> {
    self
      .0
      .get("package_names")
      .and_then(|names| names.get(platform.as_str()))
      .and_then(Value::as_str)
  }

  pub fn set_package_name(&mut self, platform: Platform, name: impl Into<String>) {
    self.set(&["package_names", platform.as_str()], Value::String(name.into()));
  }

  /// Returns true if the mapping at `key` has an entry for every one of `required`.
  pub fn has_entries(&self, key: &str, required: &[&str]) -> bool {
    match self.0.get(key) {
      Some(Value::Object(map)) => required.iter().all(|k| map.contains_key(*k)),
      _ => false,
    }
  }

  /// Substitute every `${path}` in `template` with the scalar at that path.
  pub fn render(&self, template: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
      out.push_str(&rest[..start]);
      let after = &rest[start + 2..];
      let end = after
        .find('}')
        .ok_or_else(|| ConfigError::Unterminated(template.to_string()))?;
      let expr = after[..end].trim();
      let segments = parse_path(expr)?;
      let value = path::lookup(&self.0, &segments).ok_or_else(|| ConfigError::MissingKey(expr.to_string()))?;
      match value {
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(&b.to_string()),
        _ => return Err(ConfigError::NotScalar(expr.to_string())),
      }
      rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
  }

  /// Rewrite every string found at `location` with `f`.
  ///
  /// See [`transform`](self::transform) for the location grammar. Missing
  /// keys are skipped.
  pub fn transform(&mut self, location: &str, f: &mut dyn FnMut(&str) -> String) {
    transform::apply(&mut self.0, location, f);
  }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
  if !value.is_object() {
    *value = Value::Object(Map::new());
  }
  match value {
    Value::Object(map) => map,
    _ => unreachable!("value was just replaced with an object"),
  }
}
