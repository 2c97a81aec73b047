//! Test utilities for slsrust-lib.
//!
//! Provides a stand-in for cargo that records its invocations and writes
//! binaries where cargo would, so the orchestrators can be exercised without
//! compiling anything.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::toolchain::{BuildResult, Toolchain};

/// One recorded toolchain run.
#[derive(Debug, Clone)]
pub struct Invocation {
  pub args: Vec<String>,
  pub env: BTreeMap<String, String>,
  pub cwd: PathBuf,
}

/// Fake cargo.
///
/// On success it writes each configured binary into the output directory the
/// arguments select (`target[/<triple>]/{debug,release}`). A binary's content
/// is its own name, so tests can tell which one was staged.
#[derive(Debug, Default)]
pub struct FakeCargo {
  binaries: Vec<String>,
  exit_code: Option<i32>,
  spawn_error: bool,
  calls: RefCell<Vec<Invocation>>,
}

impl FakeCargo {
  /// A cargo that builds the given binaries.
  pub fn producing(binaries: &[&str]) -> Self {
    Self {
      binaries: binaries.iter().map(|b| b.to_string()).collect(),
      exit_code: Some(0),
      ..Default::default()
    }
  }

  /// A cargo that exits with `code` without producing anything.
  pub fn failing(code: i32) -> Self {
    Self {
      exit_code: Some(code),
      ..Default::default()
    }
  }

  /// A cargo that cannot be started.
  pub fn missing() -> Self {
    Self {
      spawn_error: true,
      ..Default::default()
    }
  }

  pub fn calls(&self) -> Vec<Invocation> {
    self.calls.borrow().clone()
  }

  fn output_dir(args: &[String], cwd: &Path) -> PathBuf {
    let mut dir = cwd.join("target");
    if let Some(pos) = args.iter().position(|a| a == "--target") {
      if let Some(triple) = args.get(pos + 1) {
        dir.push(triple);
      }
    }
    let release = args.iter().any(|a| a == "--release");
    dir.join(if release { "release" } else { "debug" })
  }
}

impl Toolchain for FakeCargo {
  fn run(&self, args: &[String], env: &BTreeMap<String, String>, cwd: &Path) -> BuildResult {
    self.calls.borrow_mut().push(Invocation {
      args: args.to_vec(),
      env: env.clone(),
      cwd: cwd.to_path_buf(),
    });

    if self.spawn_error {
      return BuildResult {
        program: "cargo".to_string(),
        error: Some(std::io::Error::new(std::io::ErrorKind::NotFound, "cargo not found")),
        status: None,
      };
    }

    if self.exit_code == Some(0) {
      let dir = Self::output_dir(args, cwd);
      std::fs::create_dir_all(&dir).unwrap();
      for binary in &self.binaries {
        std::fs::write(dir.join(binary), binary).unwrap();
      }
    }

    BuildResult {
      program: "cargo".to_string(),
      error: None,
      status: self.exit_code,
    }
  }
}
