use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Host platforms a build can be driven from.
///
/// Identifiers follow the ones the serverless tooling reports (`linux`,
/// `darwin`, `win32`). Any other host is kept as `Other` and gets neither a
/// cross target nor an environment overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostPlatform {
  Linux,
  Darwin,
  Win32,
  Other,
}

#[derive(Debug, Error)]
#[error("unknown host platform: {0} (expected linux, darwin, win32 or other)")]
pub struct UnknownPlatform(pub String);

impl HostPlatform {
  /// Detect the current host platform at runtime
  pub fn current() -> Self {
    match std::env::consts::OS {
      "linux" => Self::Linux,
      "macos" => Self::Darwin,
      "windows" => Self::Win32,
      _ => Self::Other,
    }
  }

  /// Returns the lowercase string identifier for this platform
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Darwin => "darwin",
      Self::Win32 => "win32",
      Self::Other => "other",
    }
  }

  /// Whether builds from this host cross-compile to the musl target.
  pub fn is_musl_host(&self) -> bool {
    !matches!(self, Self::Other)
  }
}

impl fmt::Display for HostPlatform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for HostPlatform {
  type Err = UnknownPlatform;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "linux" => Ok(Self::Linux),
      "darwin" | "macos" => Ok(Self::Darwin),
      "win32" | "windows" => Ok(Self::Win32),
      "other" => Ok(Self::Other),
      other => Err(UnknownPlatform(other.to_string())),
    }
  }
}
