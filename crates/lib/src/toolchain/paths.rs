//! Location of cargo's build output.

use std::path::PathBuf;

use crate::config::Profile;
use crate::consts::{CARGO_TARGET_DIR, MUSL_TARGET};
use crate::platform::HostPlatform;

/// Directory cargo writes binaries to, relative to the workspace root.
///
/// `target/x86_64-unknown-linux-musl/{debug,release}` on supported hosts,
/// `target/{debug,release}` otherwise.
pub fn source_dir(profile: Profile, host: HostPlatform) -> PathBuf {
  let mut dir = PathBuf::from(CARGO_TARGET_DIR);
  if host.is_musl_host() {
    dir.push(MUSL_TARGET);
  }
  dir.push(profile.output_dir());
  dir
}

/// Path of a built binary, relative to the workspace root.
pub fn source_binary(profile: Profile, host: HostPlatform, binary: &str) -> PathBuf {
  source_dir(profile, host).join(binary)
}
