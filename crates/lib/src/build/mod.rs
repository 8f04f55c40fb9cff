//! Build contexts and the pipeline engine.
//!
//! A [`BuildContext`] holds everything one build invocation works on: the app
//! configuration, source and output directories, the enabled platforms, a
//! handful of flags, and the [`Script`] being assembled. Goals append
//! commands with [`BuildContext::add_steps`] and then call
//! [`BuildContext::run`], which filters the script and executes the
//! surviving commands in order.
//!
//! Contexts are created per invocation and never shared between builds.

mod execute;
mod types;

pub use types::*;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command::Command;
use crate::config::Configuration;
use crate::platform::Platform;
use crate::registry::Registry;
use crate::script::Script;
use crate::util::hash::config_uuid;

/// Options for creating a [`BuildContext`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
  /// Directory holding the platform sources.
  pub source_dir: PathBuf,
  /// Directory the build writes to.
  pub output_dir: PathBuf,
  /// Base for relative task paths. Defaults to the process working directory.
  pub working_dir: Option<PathBuf>,
  /// Location of the app's own code. Defaults to `<source_dir>/user`.
  pub usercode: Option<PathBuf>,
  /// File name patterns never copied out of the user's code.
  pub ignore_patterns: Vec<String>,
  /// Platforms to build for.
  pub enabled_platforms: Vec<Platform>,
  /// Customer-facing build (as opposed to an internal debugging build).
  pub external: bool,
  /// Drop the "built with" attribution from generated descriptions.
  pub remove_attribution: bool,
  /// Only produce the platform templates, without the user's code.
  pub template_only: bool,
  /// Replace the app uuid with a deterministic value derived from the configuration.
  pub test: bool,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      source_dir: PathBuf::from("."),
      output_dir: PathBuf::from("."),
      working_dir: None,
      usercode: None,
      ignore_patterns: Vec::new(),
      enabled_platforms: Platform::DEFAULT_ENABLED.to_vec(),
      external: true,
      remove_attribution: false,
      template_only: false,
      test: false,
    }
  }
}

/// Shared mutable state for one build invocation.
pub struct BuildContext<'r> {
  registry: &'r Registry,
  /// The app configuration. Tasks may write derived values into it.
  pub config: Configuration,
  pub source_dir: PathBuf,
  pub output_dir: PathBuf,
  pub working_dir: PathBuf,
  pub usercode: PathBuf,
  pub ignore_patterns: Vec<String>,
  enabled: BTreeSet<Platform>,
  pub external: bool,
  pub remove_attribution: bool,
  pub template_only: bool,
  pub test: bool,
  script: Script,
  /// Locations of unpackaged platform trees, recorded by tasks.
  pub unpackaged: BTreeMap<Platform, PathBuf>,
  /// Locations of packaged artifacts, recorded by tasks.
  pub packaged: BTreeMap<Platform, PathBuf>,
}

impl<'r> BuildContext<'r> {
  /// Create a context. Source, output and working directories are made absolute.
  pub fn new(registry: &'r Registry, mut config: Configuration, options: BuildOptions) -> Result<Self, BuildError> {
    let working_dir = match options.working_dir {
      Some(dir) => absolute(&std::env::current_dir()?, dir),
      None => std::env::current_dir()?,
    };
    let source_dir = absolute(&working_dir, options.source_dir);
    let output_dir = absolute(&working_dir, options.output_dir);
    let usercode = match options.usercode {
      Some(dir) => absolute(&working_dir, dir),
      None => source_dir.join("user"),
    };
    let enabled: BTreeSet<Platform> = options.enabled_platforms.into_iter().collect();

    if options.test {
      let uuid = config_uuid(&config);
      debug!(uuid = %uuid, "test mode: using configuration hash as uuid");
      config.set(&["uuid"], serde_json::Value::String(uuid));
    }

    info!(platforms = ?enabled, "enabled platforms");
    debug!(
      external = options.external,
      remove_attribution = options.remove_attribution,
      template_only = options.template_only,
      "build flags"
    );

    Ok(Self {
      registry,
      config,
      source_dir,
      output_dir,
      working_dir,
      usercode,
      ignore_patterns: options.ignore_patterns,
      enabled,
      external: options.external,
      remove_attribution: options.remove_attribution,
      template_only: options.template_only,
      test: options.test,
      script: Script::new(),
      unpackaged: BTreeMap::new(),
      packaged: BTreeMap::new(),
    })
  }

  pub fn registry(&self) -> &'r Registry {
    self.registry
  }

  /// Append commands to the script, keeping their relative order.
  ///
  /// Nothing is validated here; scopes and predicates are checked when the
  /// script is filtered, task names when it executes.
  pub fn add_steps(&mut self, steps: impl IntoIterator<Item = Command>) -> Result<(), ConfigurationError> {
    self.script.extend(steps)
  }

  pub fn script(&self) -> &Script {
    &self.script
  }

  pub fn enabled_platforms(&self) -> &BTreeSet<Platform> {
    &self.enabled
  }

  pub fn is_enabled(&self, platform: Platform) -> bool {
    self.enabled.contains(&platform)
  }

  /// Resolve a task path: relative paths are taken from the working directory.
  pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.working_dir.join(path)
    }
  }
}

impl fmt::Display for BuildContext<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.enabled.iter().map(Platform::as_str).collect();
    write!(f, "build ({})", names.join(", "))
  }
}

fn absolute(base: &Path, path: PathBuf) -> PathBuf {
  let joined = if path.is_absolute() { path } else { base.join(path) };
  dunce::canonicalize(&joined).unwrap_or(joined)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::TempDir;

  #[test]
  fn directories_are_made_absolute() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("src")).unwrap();
    let registry = Registry::new();

    let ctx = BuildContext::new(
      &registry,
      Configuration::default(),
      BuildOptions {
        source_dir: PathBuf::from("src"),
        output_dir: PathBuf::from("out"),
        working_dir: Some(temp.path().to_path_buf()),
        ..Default::default()
      },
    )
    .unwrap();

    assert!(ctx.source_dir.is_absolute());
    assert!(ctx.output_dir.is_absolute());
    assert!(ctx.source_dir.ends_with("src"));
    assert!(ctx.output_dir.ends_with("out"));
    assert_eq!(ctx.usercode, ctx.source_dir.join("user"));
    assert_eq!(ctx.resolve_path("a/b"), ctx.working_dir.join("a/b"));
  }

  #[test]
  fn default_platforms_exclude_ios() {
    let registry = Registry::new();
    let ctx = BuildContext::new(&registry, Configuration::default(), BuildOptions::default()).unwrap();
    assert!(ctx.is_enabled(Platform::Android));
    assert!(!ctx.is_enabled(Platform::Ios));
    assert_eq!(ctx.to_string(), "build (android, firefox, chrome, safari, ie, web)");
  }

  #[test]
  fn test_mode_replaces_uuid_deterministically() {
    let registry = Registry::new();
    let config = Configuration::new(json!({ "name": "app", "uuid": "real" }));
    let options = BuildOptions {
      test: true,
      ..Default::default()
    };

    let first = BuildContext::new(&registry, config.clone(), options.clone()).unwrap();
    let second = BuildContext::new(&registry, config, options).unwrap();

    let uuid = first.config.uuid().unwrap();
    assert_ne!(uuid, "real");
    assert_eq!(uuid.len(), crate::consts::TEST_UUID_LEN);
    assert_eq!(Some(uuid), second.config.uuid());
  }
}
