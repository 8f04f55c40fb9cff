//! Scripts: the ordered plan of commands for one build.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::build::ConfigurationError;
use crate::command::Command;

/// Errors reading a script file.
#[derive(Debug, Error)]
pub enum ScriptError {
  #[error("failed to read script {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("invalid script {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },
}

/// An ordered, append-only list of commands.
///
/// Once the pipeline engine has filtered a script it is frozen: it holds the
/// definitive execution plan and further appends are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
  commands: Vec<Command>,
  frozen: bool,
}

impl Script {
  pub fn new() -> Self {
    Self::default()
  }

  /// Read a script file: a JSON array of command tuples.
  pub fn load(path: &Path) -> Result<Self, ScriptError> {
    let content = fs::read_to_string(path).map_err(|source| ScriptError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let commands: Vec<Command> = serde_json::from_str(&content).map_err(|source| ScriptError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    Ok(Self {
      commands,
      frozen: false,
    })
  }

  /// Append commands, keeping their relative order.
  pub fn extend(&mut self, steps: impl IntoIterator<Item = Command>) -> Result<(), ConfigurationError> {
    if self.frozen {
      return Err(ConfigurationError::ScriptFrozen);
    }
    self.commands.extend(steps);
    Ok(())
  }

  /// A frozen script holding exactly `commands`.
  pub(crate) fn frozen(commands: Vec<Command>) -> Self {
    Self { commands, frozen: true }
  }

  pub fn commands(&self) -> &[Command] {
    &self.commands
  }

  pub fn len(&self) -> usize {
    self.commands.len()
  }

  pub fn is_empty(&self) -> bool {
    self.commands.is_empty()
  }

  pub fn is_frozen(&self) -> bool {
    self.frozen
  }
}
