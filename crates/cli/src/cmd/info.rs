//! Implementation of the `slsrust info` command.
//!
//! Shows how builds are set up on this host: cross target, environment
//! overrides, and where cargo's output is picked up from.

use std::collections::BTreeMap;

use anyhow::Result;

use slsrust_lib::config::Profile;
use slsrust_lib::consts::{BOOTSTRAP, MUSL_TARGET};
use slsrust_lib::platform::HostPlatform;
use slsrust_lib::plugin::Hook;
use slsrust_lib::toolchain::{build_env, source_dir};

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(host: Option<HostPlatform>, output: OutputFormat) -> Result<()> {
  let host = host.unwrap_or_else(HostPlatform::current);
  let target = host.is_musl_host().then_some(MUSL_TARGET);

  // Only the variables the host adds, not the whole process environment.
  let overrides = build_env(&BTreeMap::new(), host);

  let dev_dir = source_dir(Profile::Dev, host);
  let release_dir = source_dir(Profile::Release, host);
  let hooks: Vec<_> = Hook::ALL.iter().map(Hook::as_str).collect();

  if output.is_json() {
    return print_json(&serde_json::json!({
      "host": host.as_str(),
      "target": target,
      "env": overrides,
      "source_dirs": { "dev": dev_dir, "release": release_dir },
      "artifact": BOOTSTRAP,
      "hooks": hooks,
    }));
  }

  println!("Build setup:");
  print_stat("Host", host.as_str());
  print_stat("Target", target.unwrap_or("native"));
  for (key, value) in &overrides {
    print_stat(key, value.trim());
  }
  print_stat("Dev output", &dev_dir.display().to_string());
  print_stat("Release output", &release_dir.display().to_string());
  print_stat("Artifact", BOOTSTRAP);
  println!();
  println!("Hooks:");
  for hook in hooks {
    println!("  {}", hook);
  }

  Ok(())
}
