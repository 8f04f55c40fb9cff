//! Internet Explorer installers, built with NSIS.

use std::path::PathBuf;

use tracing::{info, warn};

use super::shell::run_shell;
use crate::build::{BuildContext, TaskError};
use crate::command::Invocation;

/// `package_ie(dir){makensis="makensis"}`: compile every installer script
/// under `<dir>/ie/dist`.
pub fn package_ie(ctx: &mut BuildContext<'_>, call: &Invocation<'_>) -> Result<(), TaskError> {
  let dist = ctx.resolve_path(call.require_arg_str(0, "build_type_dir")?).join("ie").join("dist");
  let makensis = call.kwarg_str("makensis")?.unwrap_or("makensis");

  let scripts = installer_scripts(&dist)?;
  if scripts.is_empty() {
    warn!(dir = %dist.display(), "no installer scripts found");
    return Ok(());
  }
  for script in scripts {
    info!(script = %script.display(), "building installer");
    run_shell(makensis, &[script.as_os_str()], Some(&dist))?;
  }
  Ok(())
}

fn installer_scripts(dist: &std::path::Path) -> Result<Vec<PathBuf>, TaskError> {
  let pattern = format!("{}/*.nsi", glob::Pattern::escape(&dist.to_string_lossy()));
  let mut scripts = Vec::new();
  for entry in glob::glob(&pattern)? {
    scripts.push(entry.map_err(|e| TaskError::Io(e.into_error()))?);
  }
  Ok(scripts)
}
