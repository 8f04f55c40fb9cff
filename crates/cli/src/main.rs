mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{AndroidArgs, BuildArgs, PackageArgs, PlanGoal};
use output::{OutputFormat, print_error};
use webforge_lib::platform::Platform;

/// forge - build, run and package a web app for every platform
#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format for results
  #[arg(long, global = true, value_enum, default_value_t)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Inject the app's code into the platform templates
  Generate {
    #[command(flatten)]
    build: BuildArgs,

    /// Use the build server's template layout
    #[arg(long)]
    server: bool,
  },

  /// Run a generated app on a device, simulator, browser or local server
  Run {
    /// One of android, ios, firefox or web
    target: Platform,

    #[command(flatten)]
    build: BuildArgs,

    #[command(flatten)]
    android: AndroidArgs,
  },

  /// Package the generated app for distribution
  Package {
    #[command(flatten)]
    build: BuildArgs,

    #[command(flatten)]
    package: PackageArgs,
  },

  /// Show the commands a goal would execute, without running them
  Plan {
    #[arg(value_enum)]
    goal: PlanGoal,

    /// Platform to run, for the run goal
    target: Option<Platform>,

    #[command(flatten)]
    build: BuildArgs,

    /// Use the build server's template layout
    #[arg(long)]
    server: bool,
  },

  /// Execute a JSON script of command tuples
  Script {
    /// Path to the script file
    file: PathBuf,

    #[command(flatten)]
    build: BuildArgs,
  },

  /// Show host, settings and the registered tasks
  Info,
}

fn init_logging(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let result = match cli.command {
    Commands::Generate { build, server } => cmd::cmd_generate(&build, server, cli.format),
    Commands::Run { target, build, android } => cmd::cmd_run(target, &build, &android, cli.format),
    Commands::Package { build, package } => cmd::cmd_package(&build, &package, cli.format),
    Commands::Plan {
      goal,
      target,
      build,
      server,
    } => cmd::cmd_plan(goal, target, &build, server, cli.format),
    Commands::Script { file, build } => cmd::cmd_script(&file, &build, cli.format),
    Commands::Info => cmd::cmd_info(cli.format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
