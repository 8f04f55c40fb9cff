//! The pipeline engine: filter a script, then execute it in order.
//!
//! Filtering keeps a command iff its platform scope is `all` or intersects
//! the enabled platforms, and every predicate it names holds for the current
//! context. Surviving commands keep their relative order.
//!
//! Execution is strictly sequential. The first task error stops the build:
//! later commands assume earlier ones succeeded, so nothing after a failure
//! runs. The engine never recovers from errors; it logs the failing task with
//! its arguments and hands the error back.

use tracing::{debug, error, info};

use super::{BuildContext, BuildError, ConfigurationError, RunSummary, TaskError};
use crate::command::Command;
use crate::script::Script;

impl BuildContext<'_> {
  /// Filter `commands` against the enabled platforms and predicates.
  ///
  /// Predicates are only looked up for commands whose platform scope
  /// matched. An unknown predicate name fails the whole filter.
  pub fn preprocess(&self, commands: &[Command]) -> Result<Vec<Command>, ConfigurationError> {
    let mut kept = Vec::with_capacity(commands.len());
    for command in commands {
      if !command.platforms().matches(self.enabled_platforms(), command.task())? {
        continue;
      }
      if self.predicates_hold(command)? {
        kept.push(command.clone());
      }
    }
    Ok(kept)
  }

  fn predicates_hold(&self, command: &Command) -> Result<bool, ConfigurationError> {
    let registry = self.registry();
    let predicates = command
      .predicate()
      .names()
      .iter()
      .map(|name| registry.resolve_predicate(name))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(predicates.iter().all(|predicate| predicate.check(self)))
  }

  /// Filter the script and execute every surviving command.
  ///
  /// The filtered script replaces the assembled one and is frozen; a context
  /// runs at most once.
  pub fn run(&mut self) -> Result<RunSummary, BuildError> {
    if self.script.is_frozen() {
      return Err(ConfigurationError::ScriptFrozen.into());
    }

    info!(build = %self, "running");
    info!(path = %self.source_dir.display(), "reading app code");
    info!(path = %self.output_dir.display(), "writing app");

    let plan = self.preprocess(self.script.commands())?;
    let skipped = self.script.len() - plan.len();
    self.script = Script::frozen(plan.clone());

    for (index, command) in plan.iter().enumerate() {
      debug!(index, command = %command, "planned");
    }

    for (index, command) in plan.iter().enumerate() {
      self.run_command(index, command)?;
    }

    info!(build = %self, executed = plan.len(), skipped, "finished");
    Ok(RunSummary {
      executed: plan.len(),
      skipped,
    })
  }

  fn run_command(&mut self, index: usize, command: &Command) -> Result<(), BuildError> {
    if command.task().is_empty() {
      return Err(ConfigurationError::MissingTask { index }.into());
    }
    let registry = self.registry();
    let task = registry.resolve_task(command.task()).map_err(ConfigurationError::from)?;

    debug!(task = %command.task(), command = %command, "running task");
    let call = command.invocation();
    task.run(self, &call).map_err(|err| {
      error!(
        task = %command.task(),
        args = %serde_json::Value::from(command.args().to_vec()),
        kwargs = %serde_json::Value::Object(command.kwargs().clone()),
        error = %err,
        "task failed"
      );
      match err {
        TaskError::Configuration(err) => BuildError::Configuration(err),
        source => BuildError::Task {
          task: command.task().to_string(),
          index,
          completed: index,
          source,
        },
      }
    })
  }
}
