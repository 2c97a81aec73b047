//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Stand-in for cargo.
///
/// Appends its arguments to `cargo-args.log` in the working directory, then
/// writes the package's binary (and any names in `FAKE_CARGO_BINARIES`)
/// where cargo would. Exits with `FAKE_CARGO_EXIT` when it is set.
const FAKE_CARGO: &str = r#"#!/bin/sh
echo "$*" >> cargo-args.log
if [ -n "$FAKE_CARGO_EXIT" ]; then
  exit "$FAKE_CARGO_EXIT"
fi
pkg=""
profile=debug
target=""
while [ $# -gt 0 ]; do
  case "$1" in
    -p) pkg="$2"; shift ;;
    --release) profile=release ;;
    --target) target="$2"; shift ;;
  esac
  shift
done
dir="target/$target/$profile"
mkdir -p "$dir"
for bin in "$pkg" $FAKE_CARGO_BINARIES; do
  printf '%s' "$bin" > "$dir/$bin"
  chmod +x "$dir/$bin"
done
"#;

/// Isolated service directory with a fake cargo on `PATH`.
pub struct TestEnv {
  pub temp: TempDir,
  bin_dir: PathBuf,
}

impl TestEnv {
  /// Create a service directory with the given `serverless.yml`.
  pub fn with_service(content: &str) -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("serverless.yml"), content).unwrap();

    let bin_dir = temp.path().join("fake-bin");
    std::fs::create_dir_all(&bin_dir).unwrap();
    let cargo = bin_dir.join("cargo");
    std::fs::write(&cargo, FAKE_CARGO).unwrap();
    std::fs::set_permissions(&cargo, std::fs::Permissions::from_mode(0o755)).unwrap();

    Self { temp, bin_dir }
  }

  pub fn dir(&self) -> &Path {
    self.temp.path()
  }

  pub fn bootstrap(&self) -> PathBuf {
    self.dir().join("bootstrap")
  }

  pub fn state_file(&self) -> PathBuf {
    self.dir().join(".slsrust").join("state.json")
  }

  /// Arguments cargo was called with, one line per call.
  pub fn cargo_calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.dir().join("cargo-args.log"))
      .unwrap_or_default()
      .lines()
      .map(str::to_string)
      .collect()
  }

  /// Get a pre-configured Command for the slsrust binary.
  ///
  /// Puts the fake cargo first on `PATH` and points `--dir` at the service.
  pub fn slsrust_cmd(&self, subcommand: &str) -> Command {
    let path = std::env::var("PATH").unwrap_or_default();
    let mut cmd: Command = cargo_bin_cmd!("slsrust");
    cmd.env("PATH", format!("{}:{}", self.bin_dir.display(), path));
    cmd.env_remove("FAKE_CARGO_EXIT");
    cmd.env_remove("FAKE_CARGO_BINARIES");
    cmd.env_remove("RUST_LOG");
    cmd.arg(subcommand).arg("--dir").arg(self.dir());
    cmd
  }
}
