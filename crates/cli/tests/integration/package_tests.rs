//! Package command integration tests.

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
fn package_builds_runs_command_and_cleans() {
  let env = TestEnv::with_service(SERVICE);

  env
    .slsrust_cmd("package")
    .args(["--host", "linux", "--", "cp", "bootstrap", "packaged"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Packaged 1 function(s), cleaned 1"));

  assert_eq!(std::fs::read_to_string(env.dir().join("packaged")).unwrap(), "api");
  assert!(!env.bootstrap().exists());
  assert!(!env.state_file().exists());
}

#[test]
fn package_without_command_builds_and_cleans() {
  let env = TestEnv::with_service(SERVICE);

  env
    .slsrust_cmd("package")
    .args(["--host", "linux"])
    .assert()
    .success();

  assert_eq!(env.cargo_calls().len(), 1);
  assert!(!env.bootstrap().exists());
}

#[test]
fn failed_packaging_keeps_bootstrap_for_clean() {
  let env = TestEnv::with_service(SERVICE);

  env
    .slsrust_cmd("package")
    .args(["--host", "linux", "--", "false"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("slsrust clean"));

  assert!(env.bootstrap().exists());
  assert!(env.state_file().exists());

  env.slsrust_cmd("clean").assert().success();
  assert!(!env.bootstrap().exists());
}

#[test]
fn failed_build_skips_packaging() {
  let env = TestEnv::with_service(SERVICE);

  env
    .slsrust_cmd("package")
    .args(["--host", "linux", "--", "touch", "packaged"])
    .env("FAKE_CARGO_EXIT", "1")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Build failed"));

  assert!(!env.dir().join("packaged").exists());
}
