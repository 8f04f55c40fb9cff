//! Built-in tasks.
//!
//! Every task has the same shape: it receives the mutable build context and
//! the invocation's arguments, and returns `Ok(())` or a [`TaskError`].
//! Required keyword arguments that are absent surface as
//! [`ConfigurationError::MissingArgument`](crate::build::ConfigurationError::MissingArgument).

pub mod activations;
pub mod android;
pub mod archive;
pub mod files;
pub mod firefox;
pub mod ie;
pub mod ios;
pub mod prompt;
pub mod shell;
pub mod urls;
pub mod web;

use std::path::{Path, PathBuf};

use crate::build::{BuildContext, TaskError};
use crate::registry::{Registry, RegistryError};

/// Register every built-in task.
pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
  registry.register_task("copy_files", files::copy_files)?;
  registry.register_task("rename_files", files::rename_files)?;
  registry.register_task("find_and_replace", files::find_and_replace)?;
  registry.register_task("find_and_replace_in_dir", files::find_and_replace_in_dir)?;
  registry.register_task("resolve_urls", urls::resolve_urls)?;
  registry.register_task("wrap_activations", activations::wrap_activations)?;
  registry.register_task("run_web", web::run_web)?;
  registry.register_task("package_web", web::package_web)?;
  registry.register_task("run_firefox", firefox::run_firefox)?;
  registry.register_task("package_ie", ie::package_ie)?;
  registry.register_task("run_android", android::run_android)?;
  registry.register_task("package_android", android::package_android)?;
  registry.register_task("run_ios", ios::run_ios)?;
  registry.register_task("package_ios", ios::package_ios)?;
  Ok(())
}

/// Expand a glob relative to the context's working directory.
pub(crate) fn glob_paths(ctx: &BuildContext<'_>, pattern: &str) -> Result<Vec<PathBuf>, TaskError> {
  let pattern = if Path::new(pattern).is_absolute() {
    pattern.to_string()
  } else {
    format!(
      "{}/{}",
      glob::Pattern::escape(&ctx.working_dir.to_string_lossy()),
      pattern.trim_start_matches("./")
    )
  };
  let mut found = Vec::new();
  for entry in glob::glob(&pattern)? {
    found.push(entry.map_err(|e| TaskError::Io(e.into_error()))?);
  }
  Ok(found)
}
