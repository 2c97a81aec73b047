//! Cargo command line for a function build.

use crate::config::Profile;
use crate::consts::MUSL_TARGET;
use crate::platform::HostPlatform;

/// Build the argument list passed to `cargo`.
///
/// The order is fixed: `build -p <package>`, then `--release` unless the
/// profile is `dev`, then `--target x86_64-unknown-linux-musl` on every
/// supported host, then the user's `cargo_flags` split on whitespace.
pub fn build_args(cargo_flags: &str, package: &str, profile: Profile, host: HostPlatform) -> Vec<String> {
  let mut args = vec!["build".to_string(), "-p".to_string(), package.to_string()];

  if !profile.is_dev() {
    args.push("--release".to_string());
  }

  if host.is_musl_host() {
    args.push("--target".to_string());
    args.push(MUSL_TARGET.to_string());
  }

  args.extend(cargo_flags.split_whitespace().map(str::to_string));
  args.retain(|arg| !arg.is_empty());
  args
}
