//! Implementation of the `slsrust package` command.
//!
//! Runs both hooks around a packaging command, the way the deployment
//! framework would: build, package, clean. Nothing is cleaned if the build or
//! the packaging command fails; the state is saved instead so
//! `slsrust clean` can finish the job.

use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::info;

use slsrust_lib::platform::HostPlatform;
use slsrust_lib::registry::StateStore;
use slsrust_lib::toolchain::Cargo;

use super::{ServiceArgs, Session, fresh_state, print_build_report};
use crate::output::{print_info, print_success};

/// Execute the package command.
///
/// `command` is run in the working directory with inherited output once every
/// function is built. An empty `command` builds and cleans without packaging.
pub fn cmd_package(args: &ServiceArgs, host: Option<HostPlatform>, command: &[String]) -> Result<()> {
  let session = Session::open(args, host)?;
  let store = StateStore::new(&session.ctx.working_dir);
  let mut state = fresh_state(&store, session.plugin.config())?;

  let report = match session.plugin.build(&session.ctx, &Cargo::default(), &mut state) {
    Ok(report) => report,
    Err(err) => {
      store.save(&state).context("Failed to save build state")?;
      return Err(err).context("Build failed");
    }
  };
  print_build_report(&report, &state);

  if let Some((program, program_args)) = command.split_first() {
    println!();
    print_info(&format!("Packaging with: {}", command.join(" ")));
    info!(program = %program, "running packaging command");

    let status = Command::new(program)
      .args(program_args)
      .current_dir(&session.ctx.working_dir)
      .status();

    let failure = match status {
      Ok(status) if status.success() => None,
      Ok(status) => Some(format!("Packaging command failed with {}", status)),
      Err(err) => Some(format!("Failed to run packaging command {}: {}", program, err)),
    };

    if let Some(message) = failure {
      store.save(&state).context("Failed to save build state")?;
      bail!("{message}; run 'slsrust clean' to remove the staged bootstrap");
    }
  }

  let cleaned = session.plugin.clean(&session.ctx, &mut state).context("Clean failed")?;
  store.remove().context("Failed to remove build state")?;

  println!();
  print_success(&format!(
    "Packaged {} function(s), cleaned {}",
    report.built.len(),
    cleaned.cleaned.len()
  ));

  Ok(())
}
