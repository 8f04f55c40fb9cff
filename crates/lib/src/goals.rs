//! Goals: the top-level things a user asks for.
//!
//! A goal adds the phases it needs to a build context, reports telemetry,
//! and runs the build. Callers never pick phases themselves.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::build::{BuildContext, BuildError, ConfigurationError, RunSummary};
use crate::command::{Command, Kwargs};
use crate::phases::{self, AndroidTarget, Layout};
use crate::platform::Platform;
use crate::telemetry::{self, Telemetry, TrackRecord};

#[derive(Debug, Error)]
pub enum GoalError {
  #[error("{0} apps cannot be run directly; run one of android, ios, firefox or web")]
  UnsupportedTarget(Platform),

  #[error(transparent)]
  Configuration(#[from] ConfigurationError),

  #[error(transparent)]
  Build(#[from] BuildError),
}

/// Platforms with a run phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
  Android,
  Ios,
  Firefox,
  Web,
}

impl TryFrom<Platform> for Target {
  type Error = GoalError;

  fn try_from(platform: Platform) -> Result<Self, Self::Error> {
    match platform {
      Platform::Android => Ok(Self::Android),
      Platform::Ios => Ok(Self::Ios),
      Platform::Firefox => Ok(Self::Firefox),
      Platform::Web => Ok(Self::Web),
      other => Err(GoalError::UnsupportedTarget(other)),
    }
  }
}

impl From<Target> for Platform {
  fn from(target: Target) -> Self {
    match target {
      Target::Android => Platform::Android,
      Target::Ios => Platform::Ios,
      Target::Firefox => Platform::Firefox,
      Target::Web => Platform::Web,
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&Platform::from(*self), f)
  }
}

/// Extra inputs for running an app.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
  pub android: AndroidTarget,
  /// Passed through to the run task.
  pub kwargs: Kwargs,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Goal {
  Generate { layout: Layout },
  Run { target: Target, options: RunOptions },
  Package { kwargs: Kwargs },
}

impl Goal {
  /// Name reported to telemetry.
  pub fn action(&self) -> &'static str {
    match self {
      Goal::Generate { .. } => "generate",
      Goal::Run { .. } => "run",
      Goal::Package { .. } => "package",
    }
  }

  /// The commands this goal adds, in order.
  pub fn steps(&self, ctx: &BuildContext<'_>) -> Vec<Command> {
    let dir = ctx.output_dir.as_path();
    match self {
      Goal::Generate { layout } => [
        phases::resolve_urls(),
        phases::copy_user_source_to_template(*layout, &ctx.ignore_patterns),
        phases::include_platform_in_html(*layout),
        phases::include_icons(*layout),
        phases::make_installers(dir),
      ]
      .concat(),
      Goal::Run { target, options } => match target {
        Target::Android => phases::run_android_phase(dir, &options.android, options.kwargs.clone()),
        Target::Ios => phases::run_ios_phase(dir),
        Target::Firefox => phases::run_firefox_phase(dir),
        Target::Web => phases::run_web_phase(dir),
      },
      Goal::Package { kwargs } => phases::package(dir, kwargs.clone()),
    }
  }
}

/// Add `goal`'s steps, report it, and run the build.
pub fn execute(ctx: &mut BuildContext<'_>, telemetry: &dyn Telemetry, goal: &Goal) -> Result<RunSummary, GoalError> {
  let steps = goal.steps(ctx);
  ctx.add_steps(steps)?;
  telemetry::record(telemetry, &TrackRecord::new(goal.action(), ctx.config.uuid()));
  info!(goal = goal.action(), "starting");
  Ok(ctx.run()?)
}

/// Inject the user's code into previously built platform templates.
pub fn generate(ctx: &mut BuildContext<'_>, telemetry: &dyn Telemetry, layout: Layout) -> Result<RunSummary, GoalError> {
  execute(ctx, telemetry, &Goal::Generate { layout })
}

/// Run a generated app on a device, simulator, browser or local server.
pub fn run(
  ctx: &mut BuildContext<'_>,
  telemetry: &dyn Telemetry,
  target: Target,
  options: RunOptions,
) -> Result<RunSummary, GoalError> {
  execute(ctx, telemetry, &Goal::Run { target, options })
}

/// Produce distributable artifacts for every enabled platform that has them.
pub fn package(ctx: &mut BuildContext<'_>, telemetry: &dyn Telemetry, kwargs: Kwargs) -> Result<RunSummary, GoalError> {
  execute(ctx, telemetry, &Goal::Package { kwargs })
}

/// The commands `goal` would execute in `ctx`, without running anything or
/// reporting telemetry.
pub fn plan(ctx: &BuildContext<'_>, goal: &Goal) -> Result<Vec<Command>, GoalError> {
  let mut commands = ctx.script().commands().to_vec();
  commands.extend(goal.steps(ctx));
  Ok(ctx.preprocess(&commands)?)
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use serde_json::json;
  use tempfile::TempDir;

  use super::*;
  use crate::registry::Registry;
  use crate::telemetry::TelemetryError;
  use crate::util::testutil::{context_in, read_file, write_file};

  #[derive(Default)]
  struct Recorder(RefCell<Vec<TrackRecord>>);

  impl Telemetry for Recorder {
    fn track(&self, record: &TrackRecord) -> Result<(), TelemetryError> {
      self.0.borrow_mut().push(record.clone());
      Ok(())
    }
  }

  fn tasks(commands: &[Command]) -> Vec<&str> {
    commands.iter().map(Command::task).collect()
  }

  #[test]
  fn generate_injects_user_code() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "src/index.html", "<html><head></head></html>");
    write_file(temp.path(), "src/js/app.js", "app();");
    std::fs::create_dir_all(temp.path().join("development/web")).unwrap();

    let registry = Registry::builtin().unwrap();
    let mut ctx = context_in(
      &registry,
      temp.path(),
      json!({"name": "demo", "uuid": "u1", "activations": [{"scripts": ["js/app.js"]}]}),
      &[Platform::Web],
    );
    let recorder = Recorder::default();

    let summary = generate(&mut ctx, &recorder, Layout::Customer).unwrap();

    assert_eq!(summary.executed, 3);
    assert_eq!(
      read_file(temp.path(), "development/web/src/index.html"),
      "<html><head><script src='/_forge/all.js'></script></head></html>"
    );
    assert_eq!(ctx.config.as_value()["activations"][0]["scripts"][0], "src/js/app.js");
    let records = recorder.0.borrow();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].action, "generate");
    assert_eq!(records[0].uuid.as_deref(), Some("u1"));
  }

  #[test]
  fn generate_steps_are_in_phase_order() {
    let temp = TempDir::new().unwrap();
    let registry = Registry::builtin().unwrap();
    let ctx = context_in(&registry, temp.path(), json!({}), &[Platform::Ie]);

    let planned = plan(&ctx, &Goal::Generate { layout: Layout::Customer }).unwrap();
    assert_eq!(
      tasks(&planned),
      ["resolve_urls", "copy_files", "find_and_replace_in_dir", "package_ie"]
    );
  }

  #[test]
  fn template_only_generate_skips_user_code() {
    let temp = TempDir::new().unwrap();
    let registry = Registry::builtin().unwrap();
    let mut ctx = context_in(&registry, temp.path(), json!({}), &[Platform::Web, Platform::Chrome]);
    ctx.template_only = true;

    let planned = plan(&ctx, &Goal::Generate { layout: Layout::Server }).unwrap();
    assert_eq!(tasks(&planned), ["resolve_urls"]);
  }

  #[test]
  fn run_goal_only_plans_its_target() {
    let temp = TempDir::new().unwrap();
    let registry = Registry::builtin().unwrap();
    let ctx = context_in(&registry, temp.path(), json!({}), &[Platform::Web, Platform::Android]);

    let goal = Goal::Run {
      target: Target::Android,
      options: RunOptions::default(),
    };
    assert_eq!(tasks(&plan(&ctx, &goal).unwrap()), ["run_android"]);

    let goal = Goal::Run {
      target: Target::Firefox,
      options: RunOptions::default(),
    };
    assert!(plan(&ctx, &goal).unwrap().is_empty());
  }

  #[test]
  fn plan_does_not_execute_or_freeze() {
    let temp = TempDir::new().unwrap();
    let registry = Registry::builtin().unwrap();
    let ctx = context_in(&registry, temp.path(), json!({}), &[Platform::Web]);

    let planned = plan(&ctx, &Goal::Package { kwargs: Kwargs::new() }).unwrap();
    assert_eq!(tasks(&planned), ["package_web"]);
    assert!(!ctx.script().is_frozen());
    assert!(ctx.script().is_empty());
  }

  #[test]
  fn only_four_platforms_can_run() {
    assert_eq!(Target::try_from(Platform::Web).unwrap(), Target::Web);
    assert!(matches!(
      Target::try_from(Platform::Chrome),
      Err(GoalError::UnsupportedTarget(Platform::Chrome))
    ));
    assert_eq!(Target::Ios.to_string(), "ios");
  }

  #[test]
  fn failed_goal_still_reports_telemetry() {
    let temp = TempDir::new().unwrap();
    let registry = Registry::builtin().unwrap();
    let mut ctx = context_in(&registry, temp.path(), json!({}), &[Platform::Web]);
    let recorder = Recorder::default();

    let err = package(&mut ctx, &recorder, Kwargs::new()).unwrap_err();
    assert!(matches!(err, GoalError::Build(BuildError::Task { .. })));
    assert_eq!(recorder.0.borrow()[0].action, "package");
  }
}
