//! Implementation of the `forge generate` command.
//!
//! Copies the app's code into every enabled platform template, injects the
//! platform bridge into its pages and builds installers where a platform has
//! them.

use std::time::Instant;

use anyhow::{Context, Result};

use webforge_lib::goals;
use webforge_lib::phases::Layout;
use webforge_lib::registry::Registry;

use super::{BuildArgs, load_context, load_settings, report, telemetry};
use crate::output::OutputFormat;

pub fn cmd_generate(args: &BuildArgs, server: bool, format: OutputFormat) -> Result<()> {
  let settings = load_settings()?;
  let telemetry = telemetry(&settings)?;
  let registry = Registry::builtin().context("Failed to register built-in tasks")?;
  let mut ctx = load_context(&registry, args)?;

  let layout = if server { Layout::Server } else { Layout::Customer };
  let started = Instant::now();
  let summary = goals::generate(&mut ctx, telemetry.as_ref(), layout).context("Generate failed")?;
  report(&ctx, &summary, started.elapsed(), format)
}
