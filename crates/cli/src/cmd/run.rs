//! Implementation of the `forge run` command.

use std::time::Instant;

use anyhow::{Context, Result};

use webforge_lib::goals::{self, RunOptions, Target};
use webforge_lib::phases::AndroidTarget;
use webforge_lib::platform::Platform;
use webforge_lib::registry::Registry;

use super::{AndroidArgs, BuildArgs, load_context, load_settings, report, telemetry};
use crate::output::OutputFormat;

pub fn cmd_run(platform: Platform, args: &BuildArgs, android: &AndroidArgs, format: OutputFormat) -> Result<()> {
  let target = Target::try_from(platform)?;
  let settings = load_settings()?;
  let telemetry = telemetry(&settings)?;
  let registry = Registry::builtin().context("Failed to register built-in tasks")?;
  let mut ctx = load_context(&registry, args)?;

  let sdk = android.sdk.as_deref().or(settings.android_sdk.as_deref());
  let mut options = RunOptions {
    android: AndroidTarget {
      sdk: sdk.map(|p| p.to_string_lossy().into_owned()),
      device: android.device.clone(),
    },
    ..Default::default()
  };
  options
    .kwargs
    .insert("interactive".to_string(), serde_json::Value::Bool(!android.no_interactive));

  let started = Instant::now();
  let summary = goals::run(&mut ctx, telemetry.as_ref(), target, options)
    .with_context(|| format!("Failed to run {}", target))?;
  report(&ctx, &summary, started.elapsed(), format)
}
