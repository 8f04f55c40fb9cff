//! `forge generate` against the fixture app.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn generate_injects_bridge_into_web_template() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["generate", "--platforms", "web"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete"))
    .stdout(predicate::str::contains("3 executed"));

  assert_eq!(
    env.read_file("development/web/src/index.html").trim(),
    "<html><head><script src='/_forge/all.js'></script><title>Fixture</title></head><body></body></html>"
  );
  assert!(env.root().join("development/web/src/js/app.js").exists());
}

#[test]
fn generate_json_reports_counts() {
  let env = TestEnv::with_app();

  let output = env
    .forge_cmd()
    .args(["--format", "json", "generate", "--platforms", "web,chrome"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["executed"], 5);
  assert!(report["skipped"].as_u64().unwrap() > 0);
  assert!(env.root().join("development/chrome/src/index.html").exists());
}

#[test]
fn template_only_leaves_templates_untouched() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["generate", "--platforms", "web", "--template-only"])
    .assert()
    .success()
    .stdout(predicate::str::contains("1 executed"));

  assert!(!env.root().join("development/web/src").exists());
}

#[test]
fn ignore_patterns_skip_files() {
  let env = TestEnv::with_app();
  env.write_file("src/notes.txt", "private");

  env
    .forge_cmd()
    .args(["generate", "--platforms", "web", "--ignore", "*.txt"])
    .assert()
    .success();

  assert!(env.root().join("development/web/src/index.html").exists());
  assert!(!env.root().join("development/web/src/notes.txt").exists());
}

#[test]
fn unknown_platform_is_rejected() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["generate", "--platforms", "blackberry"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown platform: blackberry"));
}

#[test]
fn missing_config_fails() {
  let env = TestEnv::empty();

  env
    .forge_cmd()
    .args(["generate", "--platforms", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to load app configuration"));
}
