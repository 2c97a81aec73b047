//! Cross-compilation environment for each host platform.

use std::collections::BTreeMap;

use crate::platform::HostPlatform;

/// Flags passed to every rustc invocation.
pub const RUSTFLAGS: &str = "RUSTFLAGS";
/// C compiler used for the target by build scripts (`cc` crate).
pub const TARGET_CC: &str = "TARGET_CC";
/// Target-specific C compiler, takes precedence over `TARGET_CC`.
pub const CC_MUSL: &str = "CC_x86_64_unknown_linux_musl";

/// Linker front-end used when building from Windows.
const WINDOWS_LINKER: &str = "rust-lld";
/// musl cross toolchain used when building from macOS.
const DARWIN_LINKER: &str = "x86_64-linux-musl-gcc";

/// Build the environment cargo runs with.
///
/// Starts from a copy of `base`. On `win32` and `darwin` the linker and C
/// compiler are pinned to a musl-capable toolchain and `-Clinker=...` is
/// appended to any `RUSTFLAGS` already present. Other hosts get `base` unchanged.
pub fn build_env(base: &BTreeMap<String, String>, host: HostPlatform) -> BTreeMap<String, String> {
  let mut env = base.clone();

  let linker = match host {
    HostPlatform::Win32 => WINDOWS_LINKER,
    HostPlatform::Darwin => DARWIN_LINKER,
    HostPlatform::Linux | HostPlatform::Other => return env,
  };

  let rustflags = format!(
    "{} -Clinker={}",
    base.get(RUSTFLAGS).map(String::as_str).unwrap_or_default(),
    linker
  );
  env.insert(RUSTFLAGS.to_string(), rustflags);
  env.insert(TARGET_CC.to_string(), linker.to_string());
  env.insert(CC_MUSL.to_string(), linker.to_string());
  env
}
