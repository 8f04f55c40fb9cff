use anyhow::{Context, Result};

use webforge_lib::consts::TOOLS_VERSION;
use webforge_lib::platform::host_triple;
use webforge_lib::platform::paths::settings_path;
use webforge_lib::registry::Registry;

use super::load_settings;
use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(format: OutputFormat) -> Result<()> {
  let registry = Registry::builtin().context("Failed to register built-in tasks")?;
  let settings = load_settings()?;
  let settings_file = settings_path().map(|p| p.display().to_string());
  let tasks: Vec<&str> = registry.task_names().collect();
  let predicates: Vec<&str> = registry.predicate_names().collect();

  if format.is_json() {
    return print_json(&serde_json::json!({
      "version": TOOLS_VERSION,
      "platform": host_triple(),
      "settings": settings_file,
      "telemetry": settings.telemetry_url().is_some(),
      "tasks": tasks,
      "predicates": predicates,
    }));
  }

  println!("forge {}", TOOLS_VERSION);
  print_stat("Platform", &host_triple());
  print_stat("Settings", settings_file.as_deref().unwrap_or("(none)"));
  print_stat("Telemetry", if settings.telemetry_url().is_some() { "on" } else { "off" });
  println!();
  println!("Tasks:");
  for name in tasks {
    println!("  {}", name);
  }
  println!("Predicates:");
  for name in predicates {
    println!("  {}", name);
  }
  Ok(())
}
