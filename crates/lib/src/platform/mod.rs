pub mod os;

pub use os::{HostPlatform, UnknownPlatform};

use std::collections::BTreeMap;

/// Snapshot of the process environment as an ordered map.
///
/// Builds receive the environment explicitly; this is the one place that
/// reads it from the process. Variables whose name or value is not valid
/// UTF-8 are dropped, and since the toolchain runs with a cleared
/// environment, cargo never sees them.
pub fn process_env() -> BTreeMap<String, String> {
  std::env::vars_os()
    .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
    .collect()
}
