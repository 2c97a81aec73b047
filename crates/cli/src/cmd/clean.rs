//! Implementation of the `slsrust clean` command.
//!
//! Runs the post-package hook against the state saved by `slsrust build`.

use anyhow::{Context, Result};

use slsrust_lib::registry::StateStore;

use super::{ServiceArgs, Session};
use crate::output::{print_info, print_success};

pub fn cmd_clean(args: &ServiceArgs) -> Result<()> {
  let session = Session::open(args, None)?;
  let store = StateStore::new(&session.ctx.working_dir);

  let Some(mut state) = store.load().context("Failed to load build state")? else {
    print_info("Nothing to clean: no build state found.");
    return Ok(());
  };

  let result = session.plugin.clean(&session.ctx, &mut state);

  // Persist whatever was unmarked before a failure.
  if state.marked().next().is_none() {
    store.remove().context("Failed to remove build state")?;
  } else {
    store.save(&state).context("Failed to save build state")?;
  }

  let report = result.context("Clean failed")?;

  if report.cleaned.is_empty() {
    print_info("Nothing to clean.");
  } else {
    for function in &report.cleaned {
      print_success(&format!("Cleaned {}", function));
    }
  }

  Ok(())
}
