//! Implementation of the `forge script` command.
//!
//! Runs a JSON file of command tuples against the built-in tasks, with the
//! same filtering as the goals. No telemetry is reported.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use webforge_lib::registry::Registry;
use webforge_lib::script::Script;

use super::{BuildArgs, load_context, report};
use crate::output::OutputFormat;

pub fn cmd_script(file: &Path, args: &BuildArgs, format: OutputFormat) -> Result<()> {
  let script = Script::load(file)?;
  info!(path = %file.display(), commands = script.len(), "loaded script");

  let registry = Registry::builtin().context("Failed to register built-in tasks")?;
  let mut ctx = load_context(&registry, args)?;
  ctx.add_steps(script.commands().to_vec())?;

  let started = Instant::now();
  let summary = ctx
    .run()
    .with_context(|| format!("Script failed: {}", file.display()))?;
  report(&ctx, &summary, started.elapsed(), format)
}
