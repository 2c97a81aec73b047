//! Clean command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

const SERVICE: &str = r#"
service: svc
provider:
  name: aws
  runtime: provided.al2
functions:
  api:
    handler: api
    rust: {}
"#;

#[test]
fn clean_removes_bootstrap_and_state() {
  let env = TestEnv::with_service(SERVICE);
  env.slsrust_cmd("build").args(["--host", "linux"]).assert().success();
  assert!(env.bootstrap().exists());

  env
    .slsrust_cmd("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Cleaned api"));

  assert!(!env.bootstrap().exists());
  assert!(!env.state_file().exists());
}

#[test]
fn clean_twice_is_a_no_op() {
  let env = TestEnv::with_service(SERVICE);
  env.slsrust_cmd("build").args(["--host", "linux"]).assert().success();
  env.slsrust_cmd("clean").assert().success();

  env
    .slsrust_cmd("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to clean"));
}

#[test]
fn clean_fails_when_staged_bootstrap_is_gone() {
  let env = TestEnv::with_service(SERVICE);
  env.slsrust_cmd("build").args(["--host", "linux"]).assert().success();
  std::fs::remove_file(env.bootstrap()).unwrap();

  env
    .slsrust_cmd("clean")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Clean failed"));

  assert!(env.state_file().exists());
}

#[test]
fn rebuild_without_clean_warns() {
  let env = TestEnv::with_service(SERVICE);
  env.slsrust_cmd("build").args(["--host", "linux"]).assert().success();

  env
    .slsrust_cmd("build")
    .args(["--host", "linux"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("A previous build was not cleaned"))
    .stderr(predicate::str::contains("already exists"));

  env
    .slsrust_cmd("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Cleaned api"));
  assert!(!env.bootstrap().exists());
}
