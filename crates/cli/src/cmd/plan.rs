//! Implementation of the `forge plan` command.
//!
//! Assembles and filters a goal's commands the same way a real build does,
//! then prints them instead of executing.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;

use webforge_lib::goals::{self, Goal, RunOptions, Target};
use webforge_lib::phases::Layout;
use webforge_lib::platform::Platform;
use webforge_lib::registry::Registry;

use super::{BuildArgs, load_context};
use crate::output::{OutputFormat, print_info, print_json, symbols};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlanGoal {
  Generate,
  Run,
  Package,
}

pub fn cmd_plan(
  goal: PlanGoal,
  target: Option<Platform>,
  args: &BuildArgs,
  server: bool,
  format: OutputFormat,
) -> Result<()> {
  let goal = match goal {
    PlanGoal::Generate => Goal::Generate {
      layout: if server { Layout::Server } else { Layout::Customer },
    },
    PlanGoal::Run => {
      let Some(platform) = target else {
        bail!("plan run needs a target platform");
      };
      Goal::Run {
        target: Target::try_from(platform)?,
        options: RunOptions::default(),
      }
    }
    PlanGoal::Package => Goal::Package {
      kwargs: Default::default(),
    },
  };

  let registry = Registry::builtin().context("Failed to register built-in tasks")?;
  let ctx = load_context(&registry, args)?;
  let planned = goals::plan(&ctx, &goal).context("Failed to plan build")?;

  if format.is_json() {
    return print_json(&planned);
  }

  if planned.is_empty() {
    print_info(&format!("Nothing to do for {} on {}", goal.action(), ctx));
    return Ok(());
  }
  println!("Plan: {} ({} command(s))", goal.action(), planned.len());
  for command in &planned {
    println!("  {} {}", symbols::ARROW, command);
  }
  Ok(())
}
