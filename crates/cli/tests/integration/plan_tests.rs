//! `forge plan`: dry runs of each goal.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn plan_lists_generate_commands_in_order() {
  let env = TestEnv::with_app();

  let output = env
    .forge_cmd()
    .args(["plan", "generate", "--platforms", "ie"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let stdout = String::from_utf8(output.stdout).unwrap();
  assert!(stdout.contains("Plan: generate (4 command(s))"));
  let resolve = stdout.find("resolve_urls").unwrap();
  let copy = stdout.find("copy_files").unwrap();
  let installer = stdout.find("package_ie").unwrap();
  assert!(resolve < copy && copy < installer);
  assert!(!env.root().join("development").exists());
}

#[test]
fn plan_json_emits_command_tuples() {
  let env = TestEnv::with_app();

  let output = env
    .forge_cmd()
    .args(["--format", "json", "plan", "package", "--platforms", "web"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let commands = plan.as_array().unwrap();
  assert_eq!(commands.len(), 1);
  assert_eq!(commands[0][0], "web");
  assert_eq!(commands[0][2], "package_web");
}

#[test]
fn plan_run_needs_a_target() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["plan", "run", "--platforms", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("needs a target"));
}

#[test]
fn plan_run_for_disabled_target_is_empty() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["plan", "run", "firefox", "--platforms", "web"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to do"));
}
