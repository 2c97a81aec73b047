//! The pre-package build hook.
//!
//! For every selected function that declares a `rust` block and runs on a
//! `provided` runtime:
//! - resolves its [`BuildConfig`] from the function block and `custom.rust`
//! - runs cargo for its package, cross-compiling to musl
//! - stages the built binary as `bootstrap` in the working directory
//! - registers `bootstrap` in the function's or the service's include patterns
//!
//! Functions are built one at a time. The first failure aborts the run; a
//! `bootstrap` staged by an earlier function is left in place.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{BuildConfig, CargoBinary, FunctionSelection, FunctionSpec, ServiceConfig, UnknownFunction};
use crate::consts::{BOOTSTRAP, SUPPORTED_PROVIDER};
use crate::platform::{HostPlatform, process_env};
use crate::registry::{BuildOutcome, PackageRegistry, PatternScope};
use crate::stage::{StageError, stage_artifact};
use crate::toolchain::{Toolchain, ToolchainError, build_args, build_env, source_binary};

/// Errors that abort a build run.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  FunctionNotFound(#[from] UnknownFunction),

  #[error("rust build of function '{function}' failed: {source}")]
  Toolchain {
    function: String,
    #[source]
    source: ToolchainError,
  },

  #[error("failed to stage bootstrap for function '{function}': {source}")]
  Stage {
    function: String,
    #[source]
    source: StageError,
  },
}

/// Host, environment and directory a build runs in.
///
/// Passed explicitly so nothing below reads process-global state.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub host: HostPlatform,
  pub env: BTreeMap<String, String>,
  /// Cargo workspace root. `bootstrap` is staged here.
  pub working_dir: PathBuf,
}

impl BuildContext {
  /// Context for the current process: detected host and process environment.
  pub fn current(working_dir: impl Into<PathBuf>) -> Self {
    Self {
      host: HostPlatform::current(),
      env: process_env(),
      working_dir: working_dir.into(),
    }
  }

  pub fn with_host(mut self, host: HostPlatform) -> Self {
    self.host = host;
    self
  }

  /// Where `bootstrap` is staged.
  pub fn artifact_path(&self) -> PathBuf {
    self.working_dir.join(BOOTSTRAP)
  }
}

/// Why a function was not built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
  /// No `rust` block.
  NotRust,
  /// A `rust` block on a runtime that does not run `bootstrap`.
  NotProvidedRuntime { runtime: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFunction {
  pub function: String,
  #[serde(flatten)]
  pub reason: SkipReason,
}

/// Non-fatal problems found during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
  /// Several functions put `bootstrap` in the one shared package. Only the
  /// last one staged ends up in it.
  MultipleSharedBootstraps { count: usize },
}

impl std::fmt::Display for BuildWarning {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      BuildWarning::MultipleSharedBootstraps { count } => write!(
        f,
        "added {count} bootstrap binaries to the shared package; behavior will be undefined"
      ),
    }
  }
}

/// Summary of a build run.
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
  pub built: Vec<BuildOutcome>,
  pub skipped: Vec<SkippedFunction>,
  pub warnings: Vec<BuildWarning>,
}

/// Build every selected Rust function and stage its binary.
///
/// Does nothing for providers other than `aws`. Each outcome is applied to
/// `registry` as soon as the function is staged.
pub fn build_all(
  config: &ServiceConfig,
  selection: &FunctionSelection,
  ctx: &BuildContext,
  toolchain: &impl Toolchain,
  registry: &mut impl PackageRegistry,
) -> Result<BuildReport, BuildError> {
  let mut report = BuildReport::default();

  if config.provider.name != SUPPORTED_PROVIDER {
    debug!(provider = %config.provider.name, "unsupported provider, nothing to build");
    return Ok(report);
  }

  let functions = config.select(selection)?;
  let mut shared_bootstraps = 0;

  for function in functions {
    if !function.is_rust() {
      debug!(function = %function.name, "not a rust function, skipping");
      report.skipped.push(SkippedFunction {
        function: function.name.clone(),
        reason: SkipReason::NotRust,
      });
      continue;
    }

    if !config.uses_provided_runtime(function) {
      let runtime = config.runtime_of(function).map(str::to_string);
      warn!(
        function = %function.name,
        runtime = runtime.as_deref().unwrap_or("none"),
        "function is declared as rust but doesn't use a provided runtime, skipping"
      );
      report.skipped.push(SkippedFunction {
        function: function.name.clone(),
        reason: SkipReason::NotProvidedRuntime { runtime },
      });
      continue;
    }

    info!(function = %function.name, "building rust function");

    let outcome = build_function(config, function, ctx, toolchain)?;
    registry.register(&outcome);
    if outcome.scope == PatternScope::Service {
      shared_bootstraps += 1;
    }
    report.built.push(outcome);
  }

  if shared_bootstraps > 1 {
    let warning = BuildWarning::MultipleSharedBootstraps {
      count: shared_bootstraps,
    };
    warn!("{warning}");
    report.warnings.push(warning);
  }

  Ok(report)
}

/// Build one eligible function and stage its binary.
fn build_function(
  config: &ServiceConfig,
  function: &FunctionSpec,
  ctx: &BuildContext,
  toolchain: &impl Toolchain,
) -> Result<BuildOutcome, BuildError> {
  let build = BuildConfig::resolve(function.rust.as_ref(), config.defaults());
  let CargoBinary { package, binary } = function.cargo_binary();

  let args = build_args(&build.cargo_flags, &package, build.profile, ctx.host);
  let env = build_env(&ctx.env, ctx.host);

  info!(host = %ctx.host, package = %package, profile = %build.profile, "running local cargo build");

  if let Err(source) = toolchain.run(&args, &env, &ctx.working_dir).into_result() {
    error!(function = %function.name, error = %source, "rust build encountered an error");
    return Err(BuildError::Toolchain {
      function: function.name.clone(),
      source,
    });
  }

  let artifact = ctx.artifact_path();
  let source = ctx.working_dir.join(source_binary(build.profile, ctx.host, &binary));
  stage_artifact(&source, &artifact, build.rewrite_bootstrap).map_err(|source| BuildError::Stage {
    function: function.name.clone(),
    source,
  })?;

  let scope = if config.package.individually {
    PatternScope::Function
  } else {
    PatternScope::Service
  };

  Ok(BuildOutcome {
    function: function.name.clone(),
    artifact,
    pattern: BOOTSTRAP.to_string(),
    scope,
    clean: true,
  })
}
