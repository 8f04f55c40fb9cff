//! End-to-end tests for the pipeline through the public API.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tempfile::TempDir;
use webforge_lib::build::{BuildContext, BuildError, BuildOptions, ConfigurationError, TaskError};
use webforge_lib::command::Command;
use webforge_lib::config::Configuration;
use webforge_lib::goals::{self, Goal};
use webforge_lib::phases::Layout;
use webforge_lib::platform::Platform;
use webforge_lib::registry::{Registry, predicate_fn, task_fn};
use webforge_lib::script::Script;
use webforge_lib::telemetry::NoopTelemetry;

fn write(root: &Path, rel: &str, contents: &str) {
  let path = root.join(rel);
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, contents).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
  std::fs::read_to_string(root.join(rel)).unwrap()
}

fn context<'r>(registry: &'r Registry, root: &Path, config: Value, platforms: &[Platform]) -> BuildContext<'r> {
  BuildContext::new(
    registry,
    Configuration::new(config),
    BuildOptions {
      source_dir: root.to_path_buf(),
      output_dir: root.to_path_buf(),
      working_dir: Some(root.to_path_buf()),
      enabled_platforms: platforms.to_vec(),
      ..Default::default()
    },
  )
  .unwrap()
}

/// A registry whose tasks append `task:arg0` to a shared log.
fn recording_registry(log: Arc<Mutex<Vec<String>>>) -> Registry {
  let mut registry = Registry::new();
  for name in ["A", "B", "C"] {
    let log = Arc::clone(&log);
    registry
      .register_task(
        name,
        task_fn(move |_ctx, call| {
          let tag = call.arg(0).and_then(Value::as_str).unwrap_or("-");
          log.lock().unwrap().push(format!("{}:{}", call.task(), tag));
          Ok(())
        }),
      )
      .unwrap();
  }
  registry
    .register_task("boom", task_fn(|_ctx, _call| Err(TaskError::Failed("boom".into()))))
    .unwrap();
  registry
    .register_predicate("pred1", predicate_fn(|ctx| ctx.is_enabled(Platform::Web)))
    .unwrap();
  registry
}

#[test]
fn server_generate_fills_templates() {
  let temp = TempDir::new().unwrap();
  let root = temp.path();
  write(root, "src/index.html", "<html><head></head></html>");
  write(root, "src/pages/inner.html", "<html><head></head></html>");
  write(root, "src/img/32.png", "32");
  write(root, "src/img/64.png", "64");
  write(root, "src/.hidden", "secret");

  let registry = Registry::builtin().unwrap();
  let mut ctx = BuildContext::new(
    &registry,
    Configuration::new(json!({
      "name": "Demo",
      "icons": { "32": "img/32.png", "64": "img/64.png" },
    })),
    BuildOptions {
      source_dir: root.to_path_buf(),
      output_dir: root.to_path_buf(),
      working_dir: Some(root.to_path_buf()),
      enabled_platforms: vec![Platform::Firefox, Platform::Chrome],
      ignore_patterns: vec![".*".to_string()],
      ..Default::default()
    },
  )
  .unwrap();

  let summary = goals::generate(&mut ctx, &NoopTelemetry, Layout::Server).unwrap();

  assert_eq!(summary.executed, 7);
  assert_eq!(summary.skipped, 24);
  assert_eq!(
    read(root, "chrome/src/index.html"),
    "<html><head><script src='/forge/all.js'></script></head></html>"
  );
  assert_eq!(
    read(root, "firefox/template-app/data/src/index.html"),
    "<html><head><script src='../forge/all.js'></script></head></html>"
  );
  assert_eq!(
    read(root, "firefox/template-app/data/src/pages/inner.html"),
    "<html><head><script src='../../forge/all.js'></script></head></html>"
  );
  assert_eq!(read(root, "firefox/template-app/output/icon.png"), "32");
  assert_eq!(read(root, "firefox/template-app/output/icon64.png"), "64");
  assert!(!root.join("chrome/src/.hidden").exists());
  assert_eq!(ctx.config.get_str("icons.32"), Some("src/img/32.png"));
}

#[test]
fn script_file_runs_in_order_and_skips_other_platforms() {
  let temp = TempDir::new().unwrap();
  write(
    temp.path(),
    "script.json",
    r#"[
      ["web", null, "A", ["first"]],
      ["android", null, "B"],
      ["all", "pred1", "C", ["third"], {}],
      ["web,android", "", "A", ["fourth"]]
    ]"#,
  );
  let script = Script::load(&temp.path().join("script.json")).unwrap();
  let log = Arc::new(Mutex::new(Vec::new()));
  let registry = recording_registry(Arc::clone(&log));
  let mut ctx = context(&registry, temp.path(), json!({}), &[Platform::Web]);

  ctx.add_steps(script.commands().to_vec()).unwrap();
  let summary = ctx.run().unwrap();

  assert_eq!(summary.executed, 3);
  assert_eq!(summary.skipped, 1);
  assert_eq!(*log.lock().unwrap(), ["A:first", "C:third", "A:fourth"]);
  assert!(ctx.script().is_frozen());
  assert_eq!(ctx.script().len(), 3);
}

#[test]
fn failure_reports_progress_and_stops() {
  let temp = TempDir::new().unwrap();
  let log = Arc::new(Mutex::new(Vec::new()));
  let registry = recording_registry(Arc::clone(&log));
  let mut ctx = context(&registry, temp.path(), json!({}), &[Platform::Web]);
  ctx
    .add_steps([
      Command::new("web", "A").with_args([json!("1")]),
      Command::new("web", "boom"),
      Command::new("web", "B").with_args([json!("never")]),
    ])
    .unwrap();

  let err = ctx.run().unwrap_err();
  match err {
    BuildError::Task {
      ref task,
      index,
      completed,
      ..
    } => {
      assert_eq!(task, "boom");
      assert_eq!(index, 1);
      assert_eq!(completed, 1);
    }
    other => panic!("expected a task failure, got {other:?}"),
  }
  assert_eq!(err.completed(), Some(1));
  assert_eq!(*log.lock().unwrap(), ["A:1"]);
}

#[test]
fn two_element_command_fails_at_execution() {
  let temp = TempDir::new().unwrap();
  write(temp.path(), "script.json", r#"[["web", null]]"#);
  let script = Script::load(&temp.path().join("script.json")).unwrap();
  let registry = recording_registry(Arc::new(Mutex::new(Vec::new())));
  let mut ctx = context(&registry, temp.path(), json!({}), &[Platform::Web]);

  ctx.add_steps(script.commands().to_vec()).unwrap();
  assert!(matches!(
    ctx.run(),
    Err(BuildError::Configuration(ConfigurationError::MissingTask { index: 0 }))
  ));
}

#[test]
fn executed_script_cannot_be_extended_or_rerun() {
  let temp = TempDir::new().unwrap();
  let registry = recording_registry(Arc::new(Mutex::new(Vec::new())));
  let mut ctx = context(&registry, temp.path(), json!({}), &[Platform::Web]);
  ctx.add_steps([Command::new("web", "A")]).unwrap();
  ctx.run().unwrap();

  assert!(matches!(
    ctx.add_steps([Command::new("web", "B")]),
    Err(ConfigurationError::ScriptFrozen)
  ));
  assert!(matches!(
    ctx.run(),
    Err(BuildError::Configuration(ConfigurationError::ScriptFrozen))
  ));
}

#[test]
fn plan_matches_what_run_executes() {
  let temp = TempDir::new().unwrap();
  let registry = Registry::builtin().unwrap();
  let ctx = context(&registry, temp.path(), json!({}), &[Platform::Android, Platform::Ie]);

  let planned = goals::plan(&ctx, &Goal::Package { kwargs: Default::default() }).unwrap();
  let tasks: Vec<&str> = planned.iter().map(Command::task).collect();
  assert_eq!(tasks, ["package_android"]);
}
