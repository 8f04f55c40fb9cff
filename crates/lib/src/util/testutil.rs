//! Test helpers for webforge-lib.
//!
//! Cross-platform subprocess commands and small fixture builders for tests
//! that need an app tree on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::build::{BuildContext, BuildOptions};
use crate::config::Configuration;
use crate::platform::Platform;
use crate::registry::Registry;

/// Returns the shell binary and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Returns the command and args to echo a message.
#[cfg(unix)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("/bin/echo", vec![msg.to_string()])
}

#[cfg(windows)]
pub fn echo_msg(msg: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), format!("echo {}", msg)])
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, contents).unwrap();
  path
}

pub fn read_file(root: &Path, rel: &str) -> String {
  fs::read_to_string(root.join(rel)).unwrap()
}

/// A context rooted at `dir` (source, output and working directory alike).
pub fn context_in<'r>(registry: &'r Registry, dir: &Path, config: Value, platforms: &[Platform]) -> BuildContext<'r> {
  BuildContext::new(
    registry,
    Configuration::new(config),
    BuildOptions {
      source_dir: dir.to_path_buf(),
      output_dir: dir.join("development"),
      working_dir: Some(dir.to_path_buf()),
      enabled_platforms: platforms.to_vec(),
      ..Default::default()
    },
  )
  .unwrap()
}
