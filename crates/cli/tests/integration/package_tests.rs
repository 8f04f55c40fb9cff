//! `forge package` and `forge run` failure modes that need no device tooling.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn package_web_writes_release_zip() {
  let env = TestEnv::with_app();
  env.forge_cmd().args(["generate", "--platforms", "web"]).assert().success();

  env
    .forge_cmd()
    .args(["package", "--platforms", "web"])
    .assert()
    .success()
    .stdout(predicate::str::contains("web:"));

  let releases: Vec<String> = std::fs::read_dir(env.root().join("release/web"))
    .unwrap()
    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(releases.len(), 1);
  assert!(releases[0].starts_with("fixtureapp-"));
  assert!(releases[0].ends_with(".zip"));
}

#[test]
fn package_without_packaging_platforms_does_nothing() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["package", "--platforms", "chrome,firefox"])
    .assert()
    .success()
    .stdout(predicate::str::contains("has a package step"));
}

#[test]
fn package_failure_names_the_task() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["package", "--platforms", "web"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("package_web"));
}

#[test]
fn run_rejects_platforms_without_run_phase() {
  let env = TestEnv::with_app();

  env
    .forge_cmd()
    .args(["run", "chrome"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be run directly"));
}
