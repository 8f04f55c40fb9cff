//! Error and result types for running a build.

use thiserror::Error;

use crate::config::ConfigError;
use crate::registry::RegistryError;
use crate::tasks::android::AndroidError;
use crate::tasks::ios::IosError;

/// The script or the registry is malformed.
///
/// Always fatal and never retried: these are bugs in whatever assembled the
/// script, not conditions of the machine running it.
#[derive(Debug, Error)]
pub enum ConfigurationError {
  #[error(transparent)]
  Registry(#[from] RegistryError),

  #[error("command for `{task}` has an empty platform scope")]
  EmptyPlatformScope { task: String },

  #[error("command for `{task}` names unknown platform `{platform}`")]
  UnknownPlatform { task: String, platform: String },

  #[error("command {index} does not name a task")]
  MissingTask { index: usize },

  #[error("{task} requires the `{name}` argument")]
  MissingArgument { task: String, name: String },

  #[error("{task}: argument `{name}` must be {expected}")]
  InvalidArgument {
    task: String,
    name: String,
    expected: &'static str,
  },

  #[error("script has already been executed and cannot be extended")]
  ScriptFrozen,
}

/// Errors raised by tasks.
#[derive(Debug, Error)]
pub enum TaskError {
  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error("config error: {0}")]
  Config(#[from] ConfigError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("{action} {}: {source}", path.display())]
  Path {
    action: &'static str,
    path: std::path::PathBuf,
    source: std::io::Error,
  },

  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  #[error("{tool} not found: {hint}")]
  ToolNotFound { tool: String, hint: String },

  #[error("invalid pattern: {0}")]
  Pattern(#[from] glob::PatternError),

  #[error("failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("archive error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error(transparent)]
  Android(#[from] AndroidError),

  #[error(transparent)]
  Ios(#[from] IosError),

  #[error("cancelled")]
  Cancelled,

  #[error("{0}")]
  Failed(String),
}

impl TaskError {
  pub fn path(action: &'static str, path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
    Self::Path {
      action,
      path: path.into(),
      source,
    }
  }
}

/// Why a build stopped.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error("configuration error: {0}")]
  Configuration(#[from] ConfigurationError),

  #[error("task `{task}` failed after {completed} command(s) completed: {source}")]
  Task {
    task: String,
    /// Position of the failing command in the filtered script.
    index: usize,
    /// Commands that ran to completion before the failure.
    completed: usize,
    #[source]
    source: TaskError,
  },

  #[error("failed to resolve build directories: {0}")]
  Io(#[from] std::io::Error),
}

impl BuildError {
  /// How far the script progressed before a task failed.
  pub fn completed(&self) -> Option<usize> {
    match self {
      Self::Task { completed, .. } => Some(*completed),
      _ => None,
    }
  }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
  /// Commands executed.
  pub executed: usize,
  /// Commands dropped by platform or predicate filtering.
  pub skipped: usize,
}
