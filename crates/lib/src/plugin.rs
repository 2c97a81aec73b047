//! Lifecycle hook registration and dispatch.
//!
//! The deployment framework calls two hooks around its artifact creation step:
//!
//! | Hook | Runs |
//! |------|------|
//! | `before:package:createDeploymentArtifacts` | [`build_all`] |
//! | `after:package:createDeploymentArtifacts` | [`clean_all`] |
//!
//! It also validates each function's `rust` block against
//! [`function_schema`].

use std::fmt;
use std::str::FromStr;

use serde_json::{Value, json};
use thiserror::Error;

use crate::build::{BuildContext, BuildError, BuildReport, build_all};
use crate::clean::{CleanError, CleanReport, clean_all};
use crate::config::{FunctionSelection, ServiceConfig, ServiceDefaults};
use crate::registry::PackageRegistry;
use crate::toolchain::Toolchain;

#[derive(Debug, Error)]
pub enum PluginError {
  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Clean(#[from] CleanError),
}

#[derive(Debug, Error)]
#[error("unknown lifecycle hook: {0}")]
pub struct UnknownHook(pub String);

/// Lifecycle events the plugin subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
  BeforePackage,
  AfterPackage,
}

impl Hook {
  pub const ALL: [Hook; 2] = [Hook::BeforePackage, Hook::AfterPackage];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::BeforePackage => "before:package:createDeploymentArtifacts",
      Self::AfterPackage => "after:package:createDeploymentArtifacts",
    }
  }
}

impl fmt::Display for Hook {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Hook {
  type Err = UnknownHook;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|hook| hook.as_str() == s)
      .ok_or_else(|| UnknownHook(s.to_string()))
  }
}

/// What a hook produced.
#[derive(Debug)]
pub enum HookOutput {
  Built(BuildReport),
  Cleaned(CleanReport),
}

/// Options the framework passes on the command line.
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
  /// Restrict the hooks to one function.
  pub function: Option<String>,
}

/// The Rust build plugin for one service.
#[derive(Debug, Clone)]
pub struct RustPlugin {
  config: ServiceConfig,
  selection: FunctionSelection,
}

impl RustPlugin {
  pub fn new(config: ServiceConfig, options: PluginOptions) -> Self {
    Self {
      config,
      selection: options.function.into(),
    }
  }

  pub fn config(&self) -> &ServiceConfig {
    &self.config
  }

  /// Service-wide build defaults (`custom.rust`).
  pub fn custom(&self) -> &ServiceDefaults {
    self.config.defaults()
  }

  pub fn selection(&self) -> &FunctionSelection {
    &self.selection
  }

  /// Hooks the plugin registers, in registration order.
  pub fn hooks(&self) -> [Hook; 2] {
    Hook::ALL
  }

  /// Dispatch a lifecycle hook.
  pub fn run(
    &self,
    hook: Hook,
    ctx: &BuildContext,
    toolchain: &impl Toolchain,
    registry: &mut impl PackageRegistry,
  ) -> Result<HookOutput, PluginError> {
    match hook {
      Hook::BeforePackage => Ok(HookOutput::Built(self.build(ctx, toolchain, registry)?)),
      Hook::AfterPackage => Ok(HookOutput::Cleaned(self.clean(ctx, registry)?)),
    }
  }

  pub fn build(
    &self,
    ctx: &BuildContext,
    toolchain: &impl Toolchain,
    registry: &mut impl PackageRegistry,
  ) -> Result<BuildReport, BuildError> {
    build_all(&self.config, &self.selection, ctx, toolchain, registry)
  }

  pub fn clean(&self, ctx: &BuildContext, registry: &mut impl PackageRegistry) -> Result<CleanReport, CleanError> {
    clean_all(&self.config, &self.selection, ctx, registry)
  }
}

/// JSON schema of the function-level properties the plugin adds.
pub fn function_schema() -> Value {
  json!({
    "properties": {
      "rust": {
        "type": "object",
        "properties": {
          "cargoFlags": { "type": "string" },
          "profile": { "type": "string" },
          "rewriteBootstrap": { "type": "boolean" }
        },
        "required": []
      }
    },
    "required": []
  })
}
