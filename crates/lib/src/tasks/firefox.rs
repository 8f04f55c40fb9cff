//! Running the Firefox add-on.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::shell::run_attached;
use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;

const HARNESS_OPTIONS: &str = "harness-options.json";
const HARNESS_BACKUP: &str = "harness-options-bak.json";
const DEFAULT_RUNNER: &str = "cfx";

/// Moves the harness options aside for the duration of a run and puts them
/// back when dropped, however the run ends.
struct HarnessBackup {
  original: PathBuf,
  backup: PathBuf,
}

impl HarnessBackup {
  fn take(addon_dir: &Path) -> Result<Self, TaskError> {
    let original = addon_dir.join(HARNESS_OPTIONS);
    let backup = addon_dir.join(HARNESS_BACKUP);
    fs::rename(&original, &backup).map_err(|e| TaskError::path("back up", &original, e))?;
    Ok(Self { original, backup })
  }
}

impl Drop for HarnessBackup {
  fn drop(&mut self) {
    debug!("cleaning up after firefox run");
    if let Err(err) = fs::rename(&self.backup, &self.original) {
      warn!(path = %self.original.display(), error = %err, "failed to restore harness options");
    }
  }
}

/// `run_firefox(dir){runner="cfx"}`
pub fn run_firefox(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let addon_dir = ctx.resolve_path(call.require_arg_str(0, "build_type_dir")?).join("firefox");
  let runner = call.kwarg_str("runner")?.unwrap_or(DEFAULT_RUNNER);

  let guard = HarnessBackup::take(&addon_dir)?;
  let harness = fs::read_to_string(&guard.backup).map_err(|e| TaskError::path("read", &guard.backup, e))?;
  serde_json::from_str::<serde_json::Value>(&harness)
    .map_err(|e| TaskError::Failed(format!("{} is not valid JSON: {}", guard.original.display(), e)))?;

  run_attached(runner, &["run"], Some(&addon_dir))
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use tempfile::TempDir;

  use crate::build::{BuildError, TaskError};
  use crate::command::Command;
  use crate::platform::Platform;
  use crate::registry::Registry;
  use crate::util::testutil::{context_in, read_file, write_file};

  fn run_with(dir: &std::path::Path, runner: &str) -> Result<(), BuildError> {
    let registry = Registry::builtin().unwrap();
    let mut ctx = context_in(&registry, dir, json!({}), &[Platform::Firefox]);
    ctx
      .add_steps([Command::new("firefox", "run_firefox")
        .with_args([json!("development")])
        .with_kwarg("runner", runner)])
      .unwrap();
    ctx.run().map(|_| ())
  }

  #[test]
  fn harness_options_restored_when_runner_fails() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "development/firefox/harness-options.json", r#"{"name":"x"}"#);

    let err = run_with(temp.path(), "definitely-not-a-real-tool-xyz").unwrap_err();

    assert!(matches!(
      err,
      BuildError::Task {
        source: TaskError::ToolNotFound { .. },
        ..
      }
    ));
    assert_eq!(
      read_file(temp.path(), "development/firefox/harness-options.json"),
      r#"{"name":"x"}"#
    );
    assert!(!temp.path().join("development/firefox/harness-options-bak.json").exists());
  }

  #[test]
  fn harness_options_restored_when_invalid() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "development/firefox/harness-options.json", "not json");

    assert!(run_with(temp.path(), "cfx").is_err());
    assert_eq!(read_file(temp.path(), "development/firefox/harness-options.json"), "not json");
  }

  #[test]
  fn missing_harness_options_is_an_error() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("development/firefox")).unwrap();
    assert!(matches!(
      run_with(temp.path(), "cfx"),
      Err(BuildError::Task {
        source: TaskError::Path { .. },
        ..
      })
    ));
  }
}
