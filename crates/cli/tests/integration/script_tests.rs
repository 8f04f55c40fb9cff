//! `forge script`: running command tuples from a file.

use predicates::prelude::*;

use super::common::{TestEnv, fixture_path};

#[test]
fn script_runs_matching_commands() {
  let env = TestEnv::with_app();
  env.write_file("development/web/index.html", "<h1>@NAME@</h1>");
  env.write_file("development/android/index.html", "<h1>@NAME@</h1>");

  env
    .forge_cmd()
    .arg("script")
    .arg(fixture_path("stamp_script.json"))
    .args(["--platforms", "web"])
    .assert()
    .success()
    .stdout(predicate::str::contains("1 executed, 1 skipped"));

  assert_eq!(env.read_file("development/web/index.html"), "<h1>Fixture App</h1>");
  assert_eq!(env.read_file("development/android/index.html"), "<h1>@NAME@</h1>");
}

#[test]
fn script_with_unknown_task_fails() {
  let env = TestEnv::with_app();
  env.write_file("bad.json", r#"[["all", null, "no_such_task"]]"#);

  env
    .forge_cmd()
    .args(["script", "bad.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no_such_task"));
}

#[test]
fn script_with_unknown_predicate_fails_before_running() {
  let env = TestEnv::with_app();
  env.write_file("development/web/index.html", "@NAME@");
  env.write_file(
    "bad.json",
    r#"[
      ["web", null, "find_and_replace", ["development/web/index.html"], {"find": "@NAME@", "replace": "x"}],
      ["web", "no_such_predicate", "find_and_replace", [], {"find": "a", "replace": "b"}]
    ]"#,
  );

  env
    .forge_cmd()
    .args(["script", "bad.json", "--platforms", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no_such_predicate"));

  assert_eq!(env.read_file("development/web/index.html"), "@NAME@");
}

#[test]
fn malformed_script_is_reported() {
  let env = TestEnv::with_app();
  env.write_file("bad.json", r#"[["web"]]"#);

  env
    .forge_cmd()
    .args(["script", "bad.json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid script"));
}
