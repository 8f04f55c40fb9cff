//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file or directory.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

fn copy_dir(from: &Path, to: &Path) {
  std::fs::create_dir_all(to).unwrap();
  for entry in std::fs::read_dir(from).unwrap() {
    let entry = entry.unwrap();
    let target = to.join(entry.file_name());
    if entry.file_type().unwrap().is_dir() {
      copy_dir(&entry.path(), &target);
    } else {
      std::fs::copy(entry.path(), &target).unwrap();
    }
  }
}

/// Isolated test environment.
///
/// Each test gets its own app directory and its own settings location, so
/// neither the user's settings nor their telemetry endpoint leak in.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// An app directory seeded with the `app` fixture.
  pub fn with_app() -> Self {
    let env = Self::empty();
    copy_dir(&fixture_path("app"), env.temp.path());
    env
  }

  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Root of the app (the working directory of every command).
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  /// Write a file relative to the app root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.temp.path().join(relative_path)).unwrap()
  }

  fn settings_path(&self) -> PathBuf {
    let p = self.temp.path().join(".settings");
    std::fs::create_dir_all(&p).unwrap();
    p
  }

  /// Get a pre-configured Command for the forge binary, run from the app root.
  ///
  /// Sets environment variables for isolated testing:
  /// - `XDG_CONFIG_HOME` / `APPDATA`: isolated settings directory
  /// - `FORGE_TELEMETRY_URL`: removed, so telemetry is off
  /// - `ANDROID_HOME`: removed, so no real SDK is picked up
  pub fn forge_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("forge");
    cmd.current_dir(self.temp.path());
    cmd.env("XDG_CONFIG_HOME", self.settings_path());
    cmd.env("APPDATA", self.settings_path());
    cmd.env_remove("FORGE_TELEMETRY_URL");
    cmd.env_remove("ANDROID_HOME");
    cmd
  }
}
