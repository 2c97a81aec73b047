//! Drives the lifecycle hooks through the public API with a custom toolchain.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use slsrust_lib::build::BuildContext;
use slsrust_lib::config::ServiceConfig;
use slsrust_lib::platform::HostPlatform;
use slsrust_lib::plugin::{Hook, HookOutput, PluginOptions, RustPlugin};
use slsrust_lib::registry::{PackageRegistry, PackageState, StateStore};
use slsrust_lib::toolchain::{BuildResult, Toolchain};
use tempfile::TempDir;

/// Writes `target[/<triple>]/<profile>/<binary>` on every run and remembers
/// the environment it was given.
struct WritingToolchain {
  binary: String,
  envs: RefCell<Vec<BTreeMap<String, String>>>,
}

impl WritingToolchain {
  fn new(binary: &str) -> Self {
    Self {
      binary: binary.to_string(),
      envs: RefCell::new(Vec::new()),
    }
  }
}

impl Toolchain for WritingToolchain {
  fn run(&self, args: &[String], env: &BTreeMap<String, String>, cwd: &Path) -> BuildResult {
    self.envs.borrow_mut().push(env.clone());

    let profile = if args.iter().any(|a| a == "--release") {
      "release"
    } else {
      "debug"
    };
    let mut dir = cwd.join("target");
    if let Some(pos) = args.iter().position(|a| a == "--target") {
      dir.push(&args[pos + 1]);
    }
    dir.push(profile);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(&self.binary), &self.binary).unwrap();

    BuildResult::success("cargo")
  }
}

fn load_service(temp: &TempDir, yaml: &str) -> ServiceConfig {
  let path = temp.path().join("serverless.yml");
  std::fs::write(&path, yaml).unwrap();
  ServiceConfig::load(&path).unwrap()
}

fn context(temp: &TempDir, host: HostPlatform) -> BuildContext {
  let mut env = BTreeMap::new();
  env.insert("RUSTFLAGS".to_string(), "-Copt-level=3".to_string());
  BuildContext {
    host,
    env,
    working_dir: temp.path().to_path_buf(),
  }
}

fn bootstrap(temp: &TempDir) -> PathBuf {
  temp.path().join("bootstrap")
}

#[test]
fn individually_packaged_function_survives_a_state_file_round_trip() {
  let temp = TempDir::new().unwrap();
  let config = load_service(
    &temp,
    r#"
service: svc
provider:
  name: aws
  runtime: provided.al2
package:
  individually: true
  patterns:
    - "!node_modules/**"
functions:
  api:
    handler: svc.api
    rust:
      profile: release
"#,
  );
  let plugin = RustPlugin::new(config, PluginOptions::default());
  let ctx = context(&temp, HostPlatform::Linux);
  let toolchain = WritingToolchain::new("api");
  let store = StateStore::new(temp.path());

  let mut state = PackageState::from_config(plugin.config());
  let built = plugin.run(Hook::BeforePackage, &ctx, &toolchain, &mut state).unwrap();
  assert!(matches!(built, HookOutput::Built(ref report) if report.built.len() == 1));
  assert_eq!(std::fs::read_to_string(bootstrap(&temp)).unwrap(), "api");
  assert_eq!(state.function_patterns("api"), ["bootstrap".to_string()]);
  assert_eq!(state.service_patterns, vec!["!node_modules/**"]);
  store.save(&state).unwrap();

  let mut reloaded = store.load().unwrap().unwrap();
  assert!(reloaded.is_marked("api"));

  let cleaned = plugin.run(Hook::AfterPackage, &ctx, &toolchain, &mut reloaded).unwrap();
  assert!(matches!(cleaned, HookOutput::Cleaned(ref report) if report.removed));
  assert!(!bootstrap(&temp).exists());
  assert!(!reloaded.is_marked("api"));

  store.remove().unwrap();
  assert!(store.load().unwrap().is_none());
}

#[test]
fn windows_host_links_with_rust_lld() {
  let temp = TempDir::new().unwrap();
  let config = load_service(
    &temp,
    r#"
service: svc
provider:
  name: aws
functions:
  api:
    handler: api
    runtime: provided
    rust: {}
"#,
  );
  let plugin = RustPlugin::new(config, PluginOptions::default());
  let toolchain = WritingToolchain::new("api");
  let mut state = PackageState::from_config(plugin.config());

  plugin
    .build(&context(&temp, HostPlatform::Win32), &toolchain, &mut state)
    .unwrap();

  let envs = toolchain.envs.borrow();
  assert_eq!(envs[0]["RUSTFLAGS"], "-Copt-level=3 -Clinker=rust-lld");
  assert_eq!(envs[0]["TARGET_CC"], "rust-lld");
}

#[test]
fn selecting_an_undeclared_function_fails() {
  let temp = TempDir::new().unwrap();
  let config = load_service(&temp, "provider:\n  name: aws\nfunctions:\n  api:\n    handler: api\n");
  let plugin = RustPlugin::new(
    config,
    PluginOptions {
      function: Some("worker".to_string()),
    },
  );
  let mut state = PackageState::from_config(plugin.config());

  let err = plugin
    .build(
      &context(&temp, HostPlatform::Linux),
      &WritingToolchain::new("api"),
      &mut state,
    )
    .unwrap_err();

  assert!(err.to_string().contains("worker"));
}
