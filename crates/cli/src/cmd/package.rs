//! Implementation of the `forge package` command.
//!
//! Produces signed, distributable artifacts under `release/<platform>/` for
//! every enabled platform that has a package step.

use std::time::Instant;

use anyhow::{Context, Result};

use webforge_lib::goals;
use webforge_lib::registry::Registry;

use super::{BuildArgs, PackageArgs, load_context, load_settings, report, telemetry};
use crate::output::{OutputFormat, print_info};

pub fn cmd_package(args: &BuildArgs, package: &PackageArgs, format: OutputFormat) -> Result<()> {
  let settings = load_settings()?;
  let telemetry = telemetry(&settings)?;
  let registry = Registry::builtin().context("Failed to register built-in tasks")?;
  let mut ctx = load_context(&registry, args)?;

  let started = Instant::now();
  let summary = goals::package(&mut ctx, telemetry.as_ref(), package.kwargs(&settings)).context("Package failed")?;
  if summary.executed == 0 && !format.is_json() {
    print_info("None of the enabled platforms has a package step.");
  }
  report(&ctx, &summary, started.elapsed(), format)
}
