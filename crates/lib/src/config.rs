//! Service definition types.
//!
//! The service definition is owned by the deployment framework. Only the parts
//! the Rust build needs are modeled here:
//! - `provider`: which cloud the service deploys to, and its default runtime
//! - `package`: packaging mode and the service-wide include patterns
//! - `custom.rust`: service-wide build defaults ([`ServiceDefaults`])
//! - `functions`: the declared functions, in declaration order ([`FunctionSpec`])
//!
//! Everything else in the file is ignored.
//!
//! # Precedence
//!
//! Per-function build settings are resolved into a [`BuildConfig`] in this order:
//! function-level `rust` block, then `custom.rust`, then the fallback
//! (no extra flags, release profile, never overwrite `bootstrap`).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::consts::{DEV_PROFILE, PROVIDED_RUNTIMES};

/// Errors that can occur while loading a service definition.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read service config {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to parse service config {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_yaml::Error },
}

/// A function was selected by name but the service does not declare it.
#[derive(Debug, Error)]
#[error("function '{0}' is not declared in the service")]
pub struct UnknownFunction(pub String);

/// Which functions a hook runs for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FunctionSelection {
  /// Every declared function, in declaration order.
  #[default]
  All,
  /// A single function, e.g. `deploy function -f <name>`.
  One(String),
}

impl From<Option<String>> for FunctionSelection {
  fn from(function: Option<String>) -> Self {
    function.map_or(Self::All, Self::One)
  }
}

/// The parts of a service definition the build hooks read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
  #[serde(default)]
  pub service: String,
  #[serde(default)]
  pub provider: ProviderConfig,
  #[serde(default)]
  pub package: PackageConfig,
  #[serde(default)]
  pub custom: CustomConfig,
  #[serde(default, deserialize_with = "ordered_functions")]
  pub functions: Vec<FunctionSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
  #[serde(default)]
  pub name: String,
  /// Runtime used by functions that do not declare their own.
  pub runtime: Option<String>,
}

/// Packaging settings, at service or function level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageConfig {
  /// Package every function separately. Only meaningful at service level.
  #[serde(default)]
  pub individually: bool,
  /// File globs to include in the deployment archive.
  #[serde(default)]
  pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomConfig {
  #[serde(default)]
  pub rust: ServiceDefaults,
}

/// Service-wide build defaults, read from `custom.rust`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefaults {
  #[serde(default)]
  pub cargo_flags: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rewrite_bootstrap: Option<bool>,
}

/// The `rust` block of a function definition.
///
/// Its presence marks the function as a Rust function, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RustConfig {
  pub cargo_flags: Option<String>,
  pub profile: Option<String>,
  pub rewrite_bootstrap: Option<bool>,
}

/// A declared function.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionSpec {
  /// Key of the function in the service definition.
  #[serde(skip)]
  pub name: String,
  /// `package[.binary]`
  #[serde(default)]
  pub handler: String,
  pub runtime: Option<String>,
  pub rust: Option<RustConfig>,
  #[serde(default)]
  pub package: PackageConfig,
}

/// The cargo package to build and the binary it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoBinary {
  pub package: String,
  pub binary: String,
}

impl FunctionSpec {
  /// Whether the function declares a `rust` block.
  pub fn is_rust(&self) -> bool {
    self.rust.is_some()
  }

  /// Split the handler into package and binary.
  ///
  /// `foo` builds package `foo` and stages binary `foo`; `foo.bar` builds
  /// package `foo` and stages binary `bar`. Segments after the second are ignored.
  pub fn cargo_binary(&self) -> CargoBinary {
    let mut parts = self.handler.split('.');
    let package = parts.next().unwrap_or_default();
    let binary = parts.next().filter(|b| !b.is_empty()).unwrap_or(package);
    CargoBinary {
      package: package.to_string(),
      binary: binary.to_string(),
    }
  }
}

impl ServiceConfig {
  /// Load a service definition from a YAML or JSON file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Look up a function by name.
  pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
    self.functions.iter().find(|f| f.name == name)
  }

  /// Resolve a selection to the functions it names.
  pub fn select(&self, selection: &FunctionSelection) -> Result<Vec<&FunctionSpec>, UnknownFunction> {
    match selection {
      FunctionSelection::All => Ok(self.functions.iter().collect()),
      FunctionSelection::One(name) => self
        .function(name)
        .map(|f| vec![f])
        .ok_or_else(|| UnknownFunction(name.clone())),
    }
  }

  /// The runtime a function runs on: its own, else the provider's.
  pub fn runtime_of<'a>(&'a self, function: &'a FunctionSpec) -> Option<&'a str> {
    function.runtime.as_deref().or(self.provider.runtime.as_deref())
  }

  /// Whether a function runs on one of the `provided` runtimes.
  pub fn uses_provided_runtime(&self, function: &FunctionSpec) -> bool {
    self
      .runtime_of(function)
      .is_some_and(|runtime| PROVIDED_RUNTIMES.contains(&runtime))
  }

  pub fn defaults(&self) -> &ServiceDefaults {
    &self.custom.rust
  }
}

/// Build optimization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
  Dev,
  Release,
}

impl Profile {
  /// Only the literal `dev` selects a debug build. An absent or empty profile
  /// builds in release mode.
  pub fn from_name(name: Option<&str>) -> Self {
    match name {
      Some(DEV_PROFILE) => Self::Dev,
      _ => Self::Release,
    }
  }

  pub fn is_dev(&self) -> bool {
    matches!(self, Self::Dev)
  }

  /// Name of cargo's output subdirectory for this profile.
  pub fn output_dir(&self) -> &'static str {
    match self {
      Self::Dev => "debug",
      Self::Release => "release",
    }
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Dev => write!(f, "dev"),
      Self::Release => write!(f, "release"),
    }
  }
}

/// Build settings for one function, after applying defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
  pub cargo_flags: String,
  pub profile: Profile,
  pub rewrite_bootstrap: bool,
}

impl BuildConfig {
  /// Merge a function's `rust` block over the service defaults.
  ///
  /// Empty strings count as unset, so an empty function-level value falls
  /// through to the service default.
  pub fn resolve(function: Option<&RustConfig>, defaults: &ServiceDefaults) -> Self {
    let non_empty = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);

    let cargo_flags = function
      .and_then(|f| non_empty(&f.cargo_flags))
      .unwrap_or_else(|| defaults.cargo_flags.clone());

    let profile = function
      .and_then(|f| non_empty(&f.profile))
      .or_else(|| non_empty(&defaults.profile));

    let rewrite_bootstrap = function
      .and_then(|f| f.rewrite_bootstrap)
      .or(defaults.rewrite_bootstrap)
      .unwrap_or(false);

    Self {
      cargo_flags,
      profile: Profile::from_name(profile.as_deref()),
      rewrite_bootstrap,
    }
  }
}

/// Deserialize the `functions` map into a list, keeping declaration order.
fn ordered_functions<'de, D>(deserializer: D) -> Result<Vec<FunctionSpec>, D::Error>
where
  D: Deserializer<'de>,
{
  struct FunctionsVisitor;

  impl<'de> Visitor<'de> for FunctionsVisitor {
    type Value = Vec<FunctionSpec>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
      f.write_str("a map of function names to function definitions")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
      E: de::Error,
    {
      Ok(Vec::new())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
      E: de::Error,
    {
      Ok(Vec::new())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
      A: MapAccess<'de>,
    {
      let mut functions = Vec::with_capacity(map.size_hint().unwrap_or(0));
      while let Some((name, mut function)) = map.next_entry::<String, FunctionSpec>()? {
        function.name = name;
        functions.push(function);
      }
      Ok(functions)
    }
  }

  deserializer.deserialize_any(FunctionsVisitor)
}
