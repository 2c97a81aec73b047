//! The post-package clean hook.
//!
//! Removes the `bootstrap` staged by the build hook once the packaging step
//! has consumed it. Only functions the registry still marks for cleanup are
//! touched.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::build::BuildContext;
use crate::config::{FunctionSelection, ServiceConfig, UnknownFunction};
use crate::consts::SUPPORTED_PROVIDER;
use crate::registry::PackageRegistry;

#[derive(Debug, Error)]
pub enum CleanError {
  #[error(transparent)]
  FunctionNotFound(#[from] UnknownFunction),

  /// A marked function's artifact could not be removed.
  #[error("failed to remove {} for function '{function}': {source}", path.display())]
  Remove {
    function: String,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Summary of a clean run.
#[derive(Debug, Default, Serialize)]
pub struct CleanReport {
  /// Functions whose staged artifact was cleaned.
  pub cleaned: Vec<String>,
  /// Whether the artifact file was actually deleted.
  pub removed: bool,
}

/// Remove the staged artifact for every selected function marked for cleanup.
///
/// All functions stage to the same path, so the file is deleted once and the
/// remaining marked functions are only unmarked. A failed deletion is fatal.
pub fn clean_all(
  config: &ServiceConfig,
  selection: &FunctionSelection,
  ctx: &BuildContext,
  registry: &mut impl PackageRegistry,
) -> Result<CleanReport, CleanError> {
  let mut report = CleanReport::default();

  if config.provider.name != SUPPORTED_PROVIDER {
    debug!(provider = %config.provider.name, "unsupported provider, nothing to clean");
    return Ok(report);
  }

  let artifact = ctx.artifact_path();

  for function in config.select(selection)? {
    if !function.is_rust() {
      debug!(function = %function.name, "not a rust function, skipping");
      continue;
    }

    if !registry.is_marked(&function.name) {
      debug!(function = %function.name, "no staged bootstrap, skipping");
      continue;
    }

    info!(function = %function.name, "cleaning rust function");

    if !report.removed {
      std::fs::remove_file(&artifact).map_err(|source| CleanError::Remove {
        function: function.name.clone(),
        path: artifact.clone(),
        source,
      })?;
      report.removed = true;
    } else {
      debug!(function = %function.name, path = %artifact.display(), "bootstrap already removed");
    }

    registry.clear_cleanup(&function.name);
    report.cleaned.push(function.name.clone());
  }

  Ok(report)
}
