mod build;
mod clean;
mod info;
mod package;
mod schema;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use info::cmd_info;
pub use package::cmd_package;
pub use schema::cmd_schema;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use slsrust_lib::build::{BuildContext, BuildReport};
use slsrust_lib::config::ServiceConfig;
use slsrust_lib::platform::HostPlatform;
use slsrust_lib::plugin::{PluginOptions, RustPlugin};
use slsrust_lib::registry::{PackageState, StateStore};

use crate::output::{format_patterns, format_runtime, print_built, print_stat, print_warning};

/// Arguments shared by the commands that act on a service.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
  /// Service definition, relative to the working directory
  #[arg(short, long, default_value = "serverless.yml")]
  pub config: PathBuf,

  /// Working directory: the cargo workspace root, where `bootstrap` is staged
  #[arg(short = 'd', long, default_value = ".")]
  pub dir: PathBuf,

  /// Only act on this function
  #[arg(short, long)]
  pub function: Option<String>,
}

/// A loaded service and the context its hooks run in.
pub struct Session {
  pub plugin: RustPlugin,
  pub ctx: BuildContext,
}

impl Session {
  pub fn open(args: &ServiceArgs, host: Option<HostPlatform>) -> Result<Self> {
    let working_dir = dunce::canonicalize(&args.dir)
      .with_context(|| format!("Working directory not found: {}", args.dir.display()))?;

    let config_path = working_dir.join(&args.config);
    let config = ServiceConfig::load(&config_path).context("Failed to load service definition")?;

    let mut ctx = BuildContext::current(working_dir);
    if let Some(host) = host {
      ctx = ctx.with_host(host);
    }

    let plugin = RustPlugin::new(
      config,
      PluginOptions {
        function: args.function.clone(),
      },
    );

    Ok(Self { plugin, ctx })
  }
}

/// State for a new build run.
///
/// Starts from the service's declared patterns and keeps the cleanup marks of
/// an earlier build that was never cleaned, so its `bootstrap` is still
/// removed by `slsrust clean` if this run fails.
fn fresh_state(store: &StateStore, config: &ServiceConfig) -> Result<PackageState> {
  let mut state = PackageState::from_config(config);

  if let Some(previous) = store.load().context("Failed to load build state")? {
    if previous.marked().next().is_some() {
      print_warning("A previous build was not cleaned; run 'slsrust clean' to remove its bootstrap.");
      state.carry_marks(&previous);
    }
  }

  Ok(state)
}

/// Print what a build produced and the resulting include patterns.
fn print_build_report(report: &BuildReport, state: &PackageState) {
  for outcome in &report.built {
    print_built(&outcome.function, &outcome.artifact);
  }

  for skipped in &report.skipped {
    if let slsrust_lib::build::SkipReason::NotProvidedRuntime { runtime } = &skipped.reason {
      print_warning(&format!(
        "Function {} is declared as rust but doesn't use a provided runtime ({}). Skipped.",
        skipped.function,
        format_runtime(runtime.as_deref())
      ));
    }
  }

  for warning in &report.warnings {
    print_warning(&warning.to_string());
  }

  if report.built.is_empty() {
    return;
  }

  println!();
  println!("Package patterns:");
  print_stat("service", &format_patterns(&state.service_patterns));
  for (name, function) in &state.functions {
    if !function.patterns.is_empty() {
      print_stat(name, &format_patterns(&function.patterns));
    }
  }
}

/// JSON rendering of a build report, for `-o json`.
fn build_report_json(report: &BuildReport, state: &PackageState) -> serde_json::Value {
  let function_patterns: serde_json::Map<_, _> = state
    .functions
    .iter()
    .map(|(name, f)| (name.clone(), serde_json::json!(f.patterns)))
    .collect();

  serde_json::json!({
    "built": report.built,
    "skipped": report.skipped,
    "warnings": report.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
    "patterns": {
      "service": state.service_patterns,
      "functions": function_patterns,
    },
  })
}
