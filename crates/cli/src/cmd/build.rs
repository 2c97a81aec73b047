//! Implementation of the `slsrust build` command.
//!
//! Runs the pre-package hook: builds every Rust function, stages `bootstrap`
//! and records the include patterns. The packaging state is saved so a later
//! `slsrust clean` knows what to remove.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use slsrust_lib::platform::HostPlatform;
use slsrust_lib::registry::StateStore;
use slsrust_lib::toolchain::Cargo;

use super::{ServiceArgs, Session, build_report_json, fresh_state, print_build_report};
use crate::output::{OutputFormat, format_duration, print_info, print_json};

/// Execute the build command.
///
/// State is saved even when the build fails, so a `bootstrap` staged before
/// the failure can still be cleaned.
pub fn cmd_build(args: &ServiceArgs, host: Option<HostPlatform>, output: OutputFormat) -> Result<()> {
  let session = Session::open(args, host)?;
  let store = StateStore::new(&session.ctx.working_dir);

  let mut state = fresh_state(&store, session.plugin.config())?;
  let started = Instant::now();

  let result = session.plugin.build(&session.ctx, &Cargo::default(), &mut state);
  store.save(&state).context("Failed to save build state")?;
  let report = result.context("Build failed")?;

  info!(path = %store.path().display(), "build state saved");

  if output.is_json() {
    return print_json(&build_report_json(&report, &state));
  }

  print_build_report(&report, &state);

  println!();
  if report.built.is_empty() {
    print_info("No rust functions to build.");
  } else {
    print_info(&format!(
      "Built {} function(s) in {}",
      report.built.len(),
      format_duration(started.elapsed())
    ));
  }

  Ok(())
}
