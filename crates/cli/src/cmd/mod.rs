//! Subcommand implementations and the arguments they share.

mod generate;
mod info;
mod package;
mod plan;
mod run;
mod script;

pub use generate::cmd_generate;
pub use info::cmd_info;
pub use package::cmd_package;
pub use plan::{PlanGoal, cmd_plan};
pub use run::cmd_run;
pub use script::cmd_script;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use tracing::debug;

use webforge_lib::build::{BuildContext, BuildOptions, RunSummary};
use webforge_lib::config::{Configuration, Settings};
use webforge_lib::consts::DEVELOPMENT_DIR;
use webforge_lib::platform::Platform;
use webforge_lib::registry::Registry;
use webforge_lib::telemetry::{HttpTelemetry, NoopTelemetry, Telemetry};

use crate::output::{OutputFormat, format_duration, print_json, print_stat, print_success};

/// Where the app lives and which platforms to build.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
  /// App configuration file
  #[arg(long, default_value = "src/config.json")]
  pub config: PathBuf,

  /// Platforms to build for, comma separated (default: all but ios)
  #[arg(short, long, value_delimiter = ',')]
  pub platforms: Vec<Platform>,

  /// Directory holding the platform sources
  #[arg(long, default_value = ".")]
  pub source_dir: PathBuf,

  /// Directory the build writes to
  #[arg(long, default_value = DEVELOPMENT_DIR)]
  pub output_dir: PathBuf,

  /// File name patterns never copied from the app's code
  #[arg(long = "ignore")]
  pub ignore_patterns: Vec<String>,

  /// Only build the templates, without the app's code
  #[arg(long)]
  pub template_only: bool,

  /// Replace the app uuid with a hash of the configuration
  #[arg(long)]
  pub test: bool,

  /// Internal debugging build rather than a customer-facing one
  #[arg(long)]
  pub internal: bool,

  /// Leave the "built with" attribution out of generated descriptions
  #[arg(long)]
  pub remove_attribution: bool,
}

impl BuildArgs {
  pub fn options(&self) -> BuildOptions {
    let enabled_platforms = if self.platforms.is_empty() {
      Platform::DEFAULT_ENABLED.to_vec()
    } else {
      self.platforms.clone()
    };
    BuildOptions {
      source_dir: self.source_dir.clone(),
      output_dir: self.output_dir.clone(),
      ignore_patterns: self.ignore_patterns.clone(),
      enabled_platforms,
      external: !self.internal,
      remove_attribution: self.remove_attribution,
      template_only: self.template_only,
      test: self.test,
      ..Default::default()
    }
  }
}

/// Device selection for `forge run android`.
#[derive(Args, Debug, Clone, Default)]
pub struct AndroidArgs {
  /// Android SDK location
  #[arg(long, env = "ANDROID_HOME")]
  pub sdk: Option<PathBuf>,

  /// Serial of the device to run on
  #[arg(long)]
  pub device: Option<String>,

  /// Never prompt; fail instead
  #[arg(long)]
  pub no_interactive: bool,
}

/// Signing inputs for `forge package`.
#[derive(Args, Debug, Clone, Default)]
pub struct PackageArgs {
  /// Android SDK location
  #[arg(long, env = "ANDROID_HOME")]
  pub sdk: Option<PathBuf>,

  /// Keystore used to sign the Android package
  #[arg(long)]
  pub keystore: Option<PathBuf>,

  #[arg(long)]
  pub storepass: Option<String>,

  #[arg(long)]
  pub keyalias: Option<String>,

  #[arg(long)]
  pub keypass: Option<String>,

  /// Provisioning profile embedded in the iOS package
  #[arg(long)]
  pub provisioning_profile: Option<PathBuf>,

  /// Signing identity for the iOS package
  #[arg(long)]
  pub certificate: Option<String>,

  /// Never prompt; fail instead
  #[arg(long)]
  pub no_interactive: bool,
}

impl PackageArgs {
  pub fn kwargs(&self, settings: &Settings) -> Map<String, Value> {
    let mut kwargs = Map::new();
    let sdk = self.sdk.as_deref().or(settings.android_sdk.as_deref());
    insert_path(&mut kwargs, "sdk", sdk);
    insert_path(&mut kwargs, "keystore", self.keystore.as_deref());
    insert_str(&mut kwargs, "storepass", self.storepass.as_deref());
    insert_str(&mut kwargs, "keyalias", self.keyalias.as_deref());
    insert_str(&mut kwargs, "keypass", self.keypass.as_deref());
    insert_path(&mut kwargs, "provisioning_profile", self.provisioning_profile.as_deref());
    insert_str(&mut kwargs, "certificate", self.certificate.as_deref());
    kwargs.insert("interactive".to_string(), Value::Bool(!self.no_interactive));
    kwargs
  }
}

fn insert_str(kwargs: &mut Map<String, Value>, name: &str, value: Option<&str>) {
  if let Some(value) = value {
    kwargs.insert(name.to_string(), Value::String(value.to_string()));
  }
}

fn insert_path(kwargs: &mut Map<String, Value>, name: &str, value: Option<&Path>) {
  insert_str(kwargs, name, value.map(|p| p.to_string_lossy()).as_deref());
}

/// Create the context for one invocation.
pub fn load_context<'r>(registry: &'r Registry, args: &BuildArgs) -> Result<BuildContext<'r>> {
  let config = Configuration::load(&args.config)
    .with_context(|| format!("Failed to load app configuration: {}", args.config.display()))?;

  BuildContext::new(registry, config, args.options()).context("Failed to set up build")
}

pub fn load_settings() -> Result<Settings> {
  Settings::load_default().context("Failed to load settings")
}

/// HTTP telemetry when an endpoint is configured, otherwise none.
pub fn telemetry(settings: &Settings) -> Result<Box<dyn Telemetry>> {
  match settings.telemetry_url() {
    Some(url) => {
      debug!(url = %url, "telemetry enabled");
      let client = HttpTelemetry::new(&url).context("Failed to create telemetry client")?;
      Ok(Box::new(client))
    }
    None => Ok(Box::new(NoopTelemetry)),
  }
}

/// Print the outcome of a finished build.
pub fn report(ctx: &BuildContext<'_>, summary: &RunSummary, elapsed: Duration, format: OutputFormat) -> Result<()> {
  if format.is_json() {
    let json = serde_json::json!({
      "executed": summary.executed,
      "skipped": summary.skipped,
      "duration_ms": elapsed.as_millis() as u64,
      "unpackaged": ctx.unpackaged,
      "packaged": ctx.packaged,
    });
    return print_json(&json);
  }

  print_success(&format!(
    "Build complete in {} ({} executed, {} skipped)",
    format_duration(elapsed),
    summary.executed,
    summary.skipped
  ));
  for (platform, path) in &ctx.packaged {
    print_stat(platform.as_str(), &path.display().to_string());
  }
  Ok(())
}
