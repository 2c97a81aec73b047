//! Cargo invocation.
//!
//! Argument and environment resolution are pure functions in [`args`] and
//! [`env`]; [`paths`] locates the binary cargo produced. [`Cargo`] runs the
//! build as a blocking child process whose output goes straight to the
//! terminal, so the user sees the compiler log live.

pub mod args;
pub mod env;
pub mod paths;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::debug;

use crate::consts::CARGO;

pub use args::build_args;
pub use env::build_env;
pub use paths::{source_binary, source_dir};

/// Errors from running the toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
  /// The compiler could not be started.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The compiler ran and failed. `code` is `None` when it was killed by a signal.
  #[error("{program} exited with status {}", .code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
  NonZeroExit { program: String, code: Option<i32> },
}

/// Outcome of one toolchain run.
#[derive(Debug)]
pub struct BuildResult {
  /// Program that was run.
  pub program: String,
  /// Set when the process could not be spawned.
  pub error: Option<io::Error>,
  /// Exit code of the process, if it ran to completion.
  pub status: Option<i32>,
}

impl BuildResult {
  pub fn success(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      error: None,
      status: Some(0),
    }
  }

  pub fn is_success(&self) -> bool {
    self.error.is_none() && self.status == Some(0)
  }

  /// Convert into a `Result`, treating a spawn error or any status other
  /// than zero as a failure.
  pub fn into_result(self) -> Result<(), ToolchainError> {
    if let Some(source) = self.error {
      return Err(ToolchainError::Spawn {
        program: self.program,
        source,
      });
    }
    match self.status {
      Some(0) => Ok(()),
      code => Err(ToolchainError::NonZeroExit {
        program: self.program,
        code,
      }),
    }
  }
}

/// Something that can build a cargo package.
pub trait Toolchain {
  /// Run a build with exactly `args` and `env`, in `cwd`, blocking until it exits.
  fn run(&self, args: &[String], env: &BTreeMap<String, String>, cwd: &Path) -> BuildResult;
}

/// The real cargo, run as a child process.
#[derive(Debug, Clone)]
pub struct Cargo {
  program: PathBuf,
}

impl Default for Cargo {
  fn default() -> Self {
    Self {
      program: PathBuf::from(CARGO),
    }
  }
}

impl Cargo {
  /// Use a different cargo executable.
  pub fn with_program(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub fn program(&self) -> &Path {
    &self.program
  }
}

impl Toolchain for Cargo {
  fn run(&self, args: &[String], env: &BTreeMap<String, String>, cwd: &Path) -> BuildResult {
    let program = self.program.display().to_string();
    debug!(program = %program, args = ?args, cwd = ?cwd, "spawning process");

    // The environment is passed in full, so nothing is inherited implicitly.
    let status = Command::new(&self.program)
      .args(args)
      .env_clear()
      .envs(env)
      .current_dir(cwd)
      .stdin(Stdio::null())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .status();

    match status {
      Ok(status) => BuildResult {
        program,
        error: None,
        status: status.code(),
      },
      Err(error) => BuildResult {
        program,
        error: Some(error),
        status: None,
      },
    }
  }
}
